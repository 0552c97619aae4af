//! gml-tr (Training) - builds the dataset, trains, evaluates and writes the package
//!
//! **Usage:**
//! ```bash
//! gml-tr [--config <file>] [--awards <file>] [--charts <file>] [--output <file>]
//! ```

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use gml_common::config::{load_config, LoggingConfig};
use gml_common::dataset::DatasetBuilder;
use gml_common::genre::CategoryInferencer;
use gml_common::history::HistoryIndex;
use gml_common::package::TrainedPackage;
use gml_common::records::{load_award_records, load_chart_records};
use gml_common::training::train;
use gml_common::Predictor;
use report::CliFormatter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Nomination model trainer
#[derive(Parser, Debug)]
#[command(name = "gml-tr")]
#[command(about = "Train the Gramlytics nomination model and rank current chart entries")]
#[command(version)]
struct Args {
    /// Config file path (overrides GML_CONFIG and the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Award history JSON
    #[arg(short, long, value_name = "FILE")]
    awards: Option<PathBuf>,

    /// Current chart JSON
    #[arg(long, value_name = "FILE")]
    charts: Option<PathBuf>,

    /// Where to write the trained package
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write the ranked predictions as JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Number of ranked predictions to print
    #[arg(long, default_value = "20")]
    top: usize,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
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

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!("Starting gml-tr v{}", env!("CARGO_PKG_VERSION"));

    let awards_path = args.awards.unwrap_or(config.pipeline.awards_path.clone());
    let charts_path = args.charts.unwrap_or(config.pipeline.charts_path.clone());
    let output_path = args.output.unwrap_or(config.pipeline.package_path.clone());

    let awards = load_award_records(&awards_path)?;
    let charts = load_chart_records(&charts_path)?;

    let resolver = config.identity_resolver()?;
    let inferencer = CategoryInferencer::default();

    let dataset = DatasetBuilder::new(resolver.as_ref(), &inferencer)
        .with_imputation(config.imputation())
        .with_null_rate_threshold(config.pipeline.null_rate_threshold)
        .build(&awards, &charts)?;
    println!("{}", CliFormatter::format_dataset(&dataset));

    let trained = train(&dataset.training, &config.training_params())?;
    println!("{}", CliFormatter::format_evaluation(&trained.evaluation));

    let package = TrainedPackage::new(trained);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    package.save(&output_path)?;
    println!("Package written to {}", output_path.display());

    let index = HistoryIndex::build(&awards, resolver.as_ref());
    let predictor = Predictor::from_package(package, resolver, inferencer)?;
    let predictions = predictor.predict_current(&charts, &index)?;
    println!("{}", CliFormatter::format_predictions(&predictions, args.top));

    if let Some(path) = args.export {
        std::fs::write(&path, serde_json::to_string_pretty(&predictions)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), count = predictions.len(), "Exported predictions");
    }

    Ok(())
}
