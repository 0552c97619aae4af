//! gml-ps (Prediction Service) - scores chart entries against a trained package
//!
//! Loads the package written by gml-tr, refuses it if it disagrees with this build,
//! indexes the award history and serves the JSON API.

use anyhow::{Context, Result};
use clap::Parser;
use gml_common::config::{load_config, LoggingConfig};
use gml_common::genre::CategoryInferencer;
use gml_common::package::TrainedPackage;
use gml_common::records::load_award_records;
use gml_ps::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for gml-ps
#[derive(Parser, Debug)]
#[command(name = "gml-ps")]
#[command(about = "Gramlytics prediction service")]
#[command(version)]
struct Args {
    /// Config file path (overrides GML_CONFIG and the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trained package to serve
    #[arg(short, long, env = "GML_PACKAGE")]
    package: Option<PathBuf>,

    /// Award history JSON used to enrich chart entries
    #[arg(short, long)]
    awards: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!(
        "Starting Gramlytics Prediction Service (gml-ps) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let package_path = args.package.unwrap_or(config.pipeline.package_path.clone());
    let package = match TrainedPackage::load(&package_path) {
        Ok(package) => package,
        Err(e) => {
            error!("Cannot serve package {}: {}", package_path.display(), e);
            return Err(e.into());
        }
    };

    let awards_path = args.awards.unwrap_or(config.pipeline.awards_path.clone());
    let awards = load_award_records(&awards_path)?;

    let state = AppState::new(
        package,
        &awards,
        config.identity_resolver()?,
        CategoryInferencer::default(),
    )?;
    let app = build_router(state);

    let host = args.host.unwrap_or(config.service.host.clone());
    let port = args.port.unwrap_or(config.service.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gml-ps listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
