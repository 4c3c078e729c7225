//! Integration tests for the facelift web server.
//!
//! These drive the real router with in-memory requests: route wiring, the
//! status/load/enhance flow and the SSE download streams, with fake
//! checkpoints standing in for the real weights.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use std::io::Cursor;
use tower::ServiceExt;

use facelift_axum::bootstrap::{AppContext, CorsConfig, ServerConfig, bootstrap};
use facelift_axum::routes::create_router;

const BOUNDARY: &str = "X-FACELIFT-TEST-BOUNDARY";

fn test_context() -> (tempfile::TempDir, AppContext) {
    let root = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        data_dir: root.path().to_path_buf(),
        ..ServerConfig::with_defaults()
    };
    let ctx = bootstrap(&config).unwrap();
    (root, ctx)
}

/// Minimal bytes that pass the checkpoint container validation.
fn fake_checkpoint() -> Vec<u8> {
    let mut bytes = vec![0x50, 0x4B, 0x03, 0x04];
    bytes.extend_from_slice(&[0u8; 60]);
    bytes
}

/// Put a fake checkpoint at every catalog path so loading succeeds
/// without any download.
fn seed_checkpoints(ctx: &AppContext) {
    for spec in ctx.lifecycle.catalog().specs() {
        std::fs::write(spec.target_path(), fake_checkpoint()).unwrap();
    }
}

/// A real, decodable PNG.
fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(2, 2);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Assemble a multipart body from (filename, bytes) uploads plus an
/// optional upscale factor field.
fn multipart_body(files: &[(&str, Vec<u8>)], upscale: Option<u32>) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(factor) = upscale {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"upscale_factor\"\r\n\r\n");
        body.extend_from_slice(factor.to_string().as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (_root, ctx) = test_context();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn status_lists_missing_models_on_fresh_layout() {
    let (_root, ctx) = test_context();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let missing = json["missing_models"].as_array().unwrap();
    assert_eq!(missing.len(), 4);
    assert_eq!(missing[0]["name"], "GFPGAN");
    assert!(missing[0]["url"].as_str().unwrap().starts_with("http"));
    assert_eq!(json["system_info"]["models_loaded"], false);
}

#[tokio::test]
async fn enhance_rejects_requests_before_load() {
    let (_root, ctx) = test_context();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let body = multipart_body(&[("photo.png", png_bytes())], None);
    let response = app
        .oneshot(multipart_request("/enhance", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not yet loaded"));
}

#[tokio::test]
async fn load_then_enhance_flow() {
    let (_root, ctx) = test_context();
    seed_checkpoints(&ctx);
    let output_dir = ctx.paths.output_dir();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    // Load: every checkpoint is present, so no downloads happen.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/load_models")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    // Status flips to loaded with nothing missing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["missing_models"].as_array().unwrap().len(), 0);
    assert_eq!(json["system_info"]["models_loaded"], true);

    // Batch of three where the middle file is not an image: two outputs,
    // the bad one skipped.
    let body = multipart_body(
        &[
            ("first.png", png_bytes()),
            ("broken.png", b"definitely not an image".to_vec()),
            ("second.png", png_bytes()),
        ],
        Some(2),
    );
    let response = app
        .clone()
        .oneshot(multipart_request("/enhance", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    let images: Vec<String> = json["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(images, ["Enhanced_first.png", "Enhanced_second.png"]);
    for name in &images {
        assert!(output_dir.join(name).is_file());
    }

    // Serve one output, then delete it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/output/Enhanced_first.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/png"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/output/Enhanced_first.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/output/Enhanced_first.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_stream_reports_unknown_models_inline() {
    let (_root, ctx) = test_context();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/download_model")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Nope"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(r#""status":"error""#));
    assert!(text.contains("unknown model"));
    assert!(text.contains("event: close"));
}

#[tokio::test]
async fn download_stream_short_circuits_when_checkpoint_exists() {
    let (_root, ctx) = test_context();
    let spec = ctx.lifecycle.catalog().get("GFPGAN").unwrap().clone();
    std::fs::write(spec.target_path(), fake_checkpoint()).unwrap();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/download_model")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"GFPGAN"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(r#""status":"completed""#));
    assert!(text.contains("event: close"));
}

#[tokio::test]
async fn initialize_stream_ends_ready_when_all_present() {
    let (_root, ctx) = test_context();
    seed_checkpoints(&ctx);
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/initialize_models")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(r#""status":"info""#));
    assert!(text.contains(r#""status":"ready""#));
    assert!(text.contains("event: close"));
}

#[tokio::test]
async fn download_flow_clears_missing_status() {
    use axum::routing::get;
    use facelift_core::{AppPaths, LifecycleManager, ModelCatalog, ModelSpec};
    use facelift_download::HttpFetcher;
    use facelift_engine::{DefaultSystemProbe, EngineBuilder};
    use std::sync::Arc;

    // In-process artifact host standing in for the release server.
    let artifact = fake_checkpoint();
    let server = axum::Router::new().route(
        "/TestModel.pth",
        get({
            let artifact = artifact.clone();
            move || async move { artifact }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server).await.unwrap();
    });

    let root = tempfile::tempdir().unwrap();
    let paths = AppPaths::new(root.path());
    paths.prepare().unwrap();
    let catalog = ModelCatalog::new(vec![ModelSpec {
        name: "TestModel".to_string(),
        filename: "TestModel.pth".to_string(),
        source_url: format!("http://{addr}/TestModel.pth"),
        dest_dir: paths.gfpgan_weights_dir(),
    }]);
    let lifecycle = Arc::new(LifecycleManager::new(
        catalog,
        Arc::new(HttpFetcher::new()),
        Arc::new(EngineBuilder),
        &DefaultSystemProbe,
    ));
    let ctx = AppContext { paths, lifecycle };
    let app = create_router(ctx, &CorsConfig::AllowAll);

    // Before: the model is reported missing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["missing_models"][0]["name"], "TestModel");

    // Download it through the SSE endpoint.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/download_model")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"TestModel"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(r#""status":"completed""#));
    assert!(text.contains("event: close"));

    // After: nothing is missing.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["missing_models"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn clear_history_empties_both_directories() {
    let (_root, ctx) = test_context();
    let input = ctx.paths.input_dir();
    let output = ctx.paths.output_dir();
    std::fs::write(input.join("old.png"), b"x").unwrap();
    std::fs::write(output.join("Enhanced_old.png"), b"y").unwrap();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clear_history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");
    assert_eq!(std::fs::read_dir(&input).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
}

#[tokio::test]
async fn download_all_serves_a_zip_of_the_outputs() {
    let (_root, ctx) = test_context();
    std::fs::write(ctx.paths.output_dir().join("Enhanced_a.png"), b"png bytes").unwrap();
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/download_all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/zip"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Zip local-file-header magic.
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}
