//! CLI entry point - the composition root.
//!
//! Argument parsing and logging setup live here; everything else is wired
//! through the bootstrap in `facelift-axum`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use facelift_axum::{ServerConfig, start_server};

/// Command-line interface for the facelift image restoration server.
#[derive(Parser)]
#[command(name = "facelift")]
#[command(about = "Face restoration and upscaling server")]
#[command(version)]
struct Cli {
    /// Data directory holding inputs, outputs and model weights
    #[arg(long = "data-dir", global = true, env = "FACELIFT_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Log level filter (overridden by RUST_LOG when set)
    #[arg(long = "log-level", global = true, env = "FACELIFT_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (the default when no command is given)
    Serve {
        /// Interface to bind
        #[arg(long, env = "FACELIFT_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "FACELIFT_PORT", default_value_t = 3020)]
        port: u16,

        /// Serve a frontend build from this directory
        #[arg(long = "static-dir")]
        static_dir: Option<PathBuf>,

        /// Skip frontend serving even when a build directory exists
        #[arg(long = "api-only")]
        api_only: bool,
    },

    /// Print missing models and system info as JSON
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        host: "127.0.0.1".to_string(),
        port: 3020,
        static_dir: None,
        api_only: false,
    }) {
        Commands::Serve {
            host,
            port,
            static_dir,
            api_only,
        } => {
            let mut config = ServerConfig {
                host,
                port,
                data_dir: cli.data_dir,
                static_dir: None,
                cors: facelift_axum::CorsConfig::AllowAll,
            };

            // Static dir resolution: api-only flag > explicit flag >
            // default location > API-only.
            if !api_only {
                if let Some(dir) = static_dir {
                    config.static_dir = Some(dir);
                } else {
                    let candidates = ["./static", "./frontend/dist", "./dist"];
                    for candidate in &candidates {
                        let path = std::path::Path::new(candidate);
                        if path.join("index.html").exists() {
                            config.static_dir = Some(path.to_path_buf());
                            break;
                        }
                    }
                }
            }

            println!();
            println!("  facelift server starting...");
            if let Some(ref dir) = config.static_dir {
                println!("  serving UI from: {}", dir.display());
            } else {
                println!("  API only (use --static-dir to serve a frontend build)");
            }
            println!("  http://{}:{}", config.host, config.port);
            println!();
            println!("  Press Ctrl+C to stop");
            println!();

            start_server(config).await?;
        }
        Commands::Check => {
            let config = ServerConfig {
                data_dir: cli.data_dir,
                ..ServerConfig::with_defaults()
            };
            let ctx = facelift_axum::bootstrap::bootstrap(&config)?;

            let missing: Vec<_> = ctx
                .lifecycle
                .catalog()
                .missing()?
                .into_iter()
                .map(|spec| {
                    serde_json::json!({
                        "name": spec.name,
                        "filename": spec.filename,
                        "url": spec.source_url,
                    })
                })
                .collect();

            let report = serde_json::json!({
                "missing_models": missing,
                "system_info": ctx.lifecycle.system_info(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
