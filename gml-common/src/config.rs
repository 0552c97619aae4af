//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `GML_CONFIG` environment variable
//! 3. User config directory (`<config_dir>/gramlytics/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! Every field is defaulted, so an empty file is a valid configuration.

use crate::dataset::Imputation;
use crate::identity::{AliasResolver, ExactNormalizer, IdentityResolver};
use crate::model::TrainerParams;
use crate::training::TrainingParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "GML_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GmlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    /// Canonical artist name → alternate spellings
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Data locations and dataset assembly settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_awards_path")]
    pub awards_path: PathBuf,

    #[serde(default = "default_charts_path")]
    pub charts_path: PathBuf,

    #[serde(default = "default_package_path")]
    pub package_path: PathBuf,

    /// Null rate of a core feature at which a data-quality warning is raised
    #[serde(default = "default_null_rate_threshold")]
    pub null_rate_threshold: f64,

    #[serde(default = "default_imputed_peak")]
    pub imputed_peak_position: u32,

    #[serde(default = "default_imputed_weeks")]
    pub imputed_weeks_on_chart: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            awards_path: default_awards_path(),
            charts_path: default_charts_path(),
            package_path: default_package_path(),
            null_rate_threshold: default_null_rate_threshold(),
            imputed_peak_position: default_imputed_peak(),
            imputed_weeks_on_chart: default_imputed_weeks(),
        }
    }
}

/// Split and optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Inverse L2 regularization strength
    #[serde(default = "default_regularization")]
    pub regularization: f64,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            regularization: default_regularization(),
            learning_rate: default_learning_rate(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Prediction service bind address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_awards_path() -> PathBuf {
    PathBuf::from("data/grammy_history.json")
}

fn default_charts_path() -> PathBuf {
    PathBuf::from("data/billboard_current.json")
}

fn default_package_path() -> PathBuf {
    PathBuf::from("models/gramlytics_model.json")
}

fn default_null_rate_threshold() -> f64 {
    0.10
}

fn default_imputed_peak() -> u32 {
    Imputation::default().peak_position
}

fn default_imputed_weeks() -> u32 {
    Imputation::default().weeks_on_chart
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_regularization() -> f64 {
    TrainerParams::default().regularization
}

fn default_learning_rate() -> f64 {
    TrainerParams::default().learning_rate
}

fn default_max_iterations() -> usize {
    TrainerParams::default().max_iterations
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5790
}

impl GmlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let t = self.pipeline.null_rate_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(Error::Config(format!(
                "pipeline.null_rate_threshold must be in (0, 1), got {}",
                t
            )));
        }
        let f = self.training.test_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(Error::Config(format!(
                "training.test_fraction must be in (0, 1), got {}",
                f
            )));
        }
        if self.training.regularization <= 0.0 || self.training.learning_rate <= 0.0 {
            return Err(Error::Config(
                "training.regularization and training.learning_rate must be positive".to_string(),
            ));
        }
        if self.pipeline.imputed_peak_position == 0 || self.pipeline.imputed_weeks_on_chart == 0 {
            return Err(Error::Config(
                "imputed chart statistics must be positive".to_string(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(Error::Config(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }

    pub fn imputation(&self) -> Imputation {
        Imputation {
            peak_position: self.pipeline.imputed_peak_position,
            weeks_on_chart: self.pipeline.imputed_weeks_on_chart,
        }
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams {
            test_fraction: self.training.test_fraction,
            seed: self.training.seed,
            trainer: TrainerParams {
                regularization: self.training.regularization,
                learning_rate: self.training.learning_rate,
                max_iterations: self.training.max_iterations,
                ..TrainerParams::default()
            },
        }
    }

    /// Alias table resolver when aliases are configured, plain normalization otherwise
    pub fn identity_resolver(&self) -> Result<Box<dyn IdentityResolver>> {
        if self.aliases.is_empty() {
            return Ok(Box::new(ExactNormalizer));
        }
        let resolver = AliasResolver::from_table(&self.aliases)?;
        info!(aliases = resolver.len(), "Loaded artist alias table");
        Ok(Box::new(resolver))
    }
}

/// Config file path following the priority order; `None` means compiled defaults
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    let user_config = default_config_path()?;
    if user_config.exists() {
        Some(user_config)
    } else {
        None
    }
}

/// `<config_dir>/gramlytics/config.toml` for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gramlytics").join("config.toml"))
}

/// Resolve, read, parse and validate the configuration
///
/// A named file that does not exist falls back to defaults with a warning; a file
/// that exists but does not parse is an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<GmlConfig> {
    let config = match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
        None => GmlConfig::default(),
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(content) => {
                let config: GmlConfig = toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                GmlConfig::default()
            }
            Err(e) => return Err(Error::Io(e)),
        },
    };

    config.validate()?;
    Ok(config)
}
