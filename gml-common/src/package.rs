//! Trained package: classifier, category mapping and feature ordering in one artifact
//!
//! The package is the only thing handed from training to scoring. Loading verifies it
//! against the running code before anything is scored.

use crate::features::{CategoryMapping, FEATURE_COUNT, FEATURE_NAMES};
use crate::model::LogisticModel;
use crate::scorer::{Classifier, Scorer};
use crate::training::{EvaluationReport, TrainedModel};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// Package format version written by this build
///
/// Packages with a different major version are refused.
pub const PACKAGE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPackage {
    pub model: LogisticModel,
    pub category_mapping: CategoryMapping,
    pub feature_names: Vec<String>,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    #[serde(default)]
    pub evaluation: Option<EvaluationReport>,
}

impl TrainedPackage {
    pub fn new(trained: TrainedModel) -> Self {
        Self {
            model: trained.model,
            category_mapping: trained.mapping,
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            version: PACKAGE_VERSION.to_string(),
            trained_at: Utc::now(),
            evaluation: Some(trained.evaluation),
        }
    }

    /// Check the package against the running code
    ///
    /// # Errors
    /// `Error::VersionMismatch` when the major version, the feature ordering, the
    /// classifier width or the category mapping disagree, or when the standardization
    /// vectors are short or hold a zero or non-finite scale.
    pub fn verify(&self) -> Result<()> {
        if major(&self.version) != major(PACKAGE_VERSION) {
            return Err(Error::VersionMismatch {
                expected: format!("package version {}.x", major(PACKAGE_VERSION)),
                found: self.version.clone(),
            });
        }

        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(Error::VersionMismatch {
                expected: format!("features [{}]", FEATURE_NAMES.join(", ")),
                found: format!("features [{}]", self.feature_names.join(", ")),
            });
        }

        if self.model.feature_count() != FEATURE_COUNT {
            return Err(Error::VersionMismatch {
                expected: format!("{} classifier coefficients", FEATURE_COUNT),
                found: format!("{} classifier coefficients", self.model.feature_count()),
            });
        }

        let means = self.model.feature_means();
        let scales = self.model.feature_scales();
        if means.len() != FEATURE_COUNT || scales.len() != FEATURE_COUNT {
            return Err(Error::VersionMismatch {
                expected: format!("{} feature means and scales", FEATURE_COUNT),
                found: format!("{} means, {} scales", means.len(), scales.len()),
            });
        }
        if let Some(bad) = scales.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(Error::VersionMismatch {
                expected: "finite non-zero feature scales".to_string(),
                found: format!("scale {}", bad),
            });
        }
        if let Some(bad) = means.iter().find(|m| !m.is_finite()) {
            return Err(Error::VersionMismatch {
                expected: "finite feature means".to_string(),
                found: format!("mean {}", bad),
            });
        }

        self.category_mapping.verify()
    }

    /// Write as pretty JSON; temp file then rename, so readers never see a partial file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = std::path::PathBuf::from(temp);

        std::fs::write(&temp, json)?;
        if let Err(e) = std::fs::rename(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }

        info!(path = %path.display(), version = %self.version, "Saved trained package");
        Ok(())
    }

    /// Read and verify a package
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::MissingData(format!("trained package not found: {}", path.display()))
            }
            _ => Error::Io(e),
        })?;
        let package: TrainedPackage = serde_json::from_str(&content)?;

        if let Err(e) = package.verify() {
            error!(path = %path.display(), error = %e, "Refusing trained package");
            return Err(e);
        }

        info!(
            path = %path.display(),
            version = %package.version,
            trained_at = %package.trained_at,
            genres = package.category_mapping.len(),
            "Loaded trained package"
        );
        Ok(package)
    }

    /// Verified scorer and the mapping it was trained with
    pub fn into_scorer(self) -> Result<(Scorer<LogisticModel>, CategoryMapping)> {
        self.verify()?;
        Ok((Scorer::new(self.model)?, self.category_mapping))
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
