//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use facelift_core::{ModelSpec, SystemInfo};

/// One entry in the status endpoint's missing-model list.
#[derive(Debug, Serialize, Deserialize)]
pub struct MissingModel {
    pub name: String,
    pub filename: String,
    pub url: String,
}

impl From<ModelSpec> for MissingModel {
    fn from(spec: ModelSpec) -> Self {
        Self {
            name: spec.name,
            filename: spec.filename,
            url: spec.source_url,
        }
    }
}

/// Response of `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub missing_models: Vec<MissingModel>,
    pub system_info: SystemInfo,
}

/// Body of `POST /api/download_model`.
///
/// The catalog is authoritative: the model is resolved by name, and the
/// advisory `filename`/`url` fields the frontend echoes back are accepted
/// but not trusted.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub name: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Response of `POST /api/load_models`.
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub status: &'static str,
    pub message: String,
}

/// Response of `POST /enhance`: output filenames of the uploads that made
/// it through the pipeline.
#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub status: &'static str,
    pub images: Vec<String>,
}

/// Minimal `{"status": "success"}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct SimpleStatus {
    pub status: &'static str,
}

impl SimpleStatus {
    #[must_use]
    pub const fn success() -> Self {
        Self { status: "success" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_request_tolerates_advisory_fields() {
        let req: DownloadRequest = serde_json::from_str(r#"{"name":"GFPGAN"}"#).unwrap();
        assert_eq!(req.name, "GFPGAN");
        assert!(req.filename.is_none());

        let req: DownloadRequest = serde_json::from_str(
            r#"{"name":"GFPGAN","filename":"GFPGANv1.4.pth","url":"http://example/w.pth"}"#,
        )
        .unwrap();
        assert_eq!(req.filename.as_deref(), Some("GFPGANv1.4.pth"));
        assert_eq!(req.url.as_deref(), Some("http://example/w.pth"));
    }

    #[test]
    fn missing_model_takes_wire_field_names() {
        let spec = ModelSpec {
            name: "GFPGAN".into(),
            filename: "GFPGANv1.4.pth".into(),
            source_url: "http://example/w.pth".into(),
            dest_dir: "/data/gfpgan/weights".into(),
        };
        let json = serde_json::to_value(MissingModel::from(spec)).unwrap();
        assert_eq!(json["name"], "GFPGAN");
        assert_eq!(json["filename"], "GFPGANv1.4.pth");
        assert_eq!(json["url"], "http://example/w.pth");
        assert!(json.get("dest_dir").is_none());
    }
}
