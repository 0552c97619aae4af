//! Scorer: fixed-order feature vector → nomination probability and label

use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Probability at or above which an entry is labeled as a likely nominee
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary classifier consumed by the scorer
///
/// Training loss, optimizer and regularization are the implementation's business; the
/// scorer only needs a probability for a vector in [`FEATURE_NAMES`] order.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier was trained on
    fn feature_count(&self) -> usize;

    /// Estimated probability of the positive class
    fn predict_probability(&self, features: &[f64]) -> f64;
}

/// Scorer output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub probability: f64,
    pub label: bool,
}

/// Wraps a trained classifier
///
/// Deterministic and side-effect free: identical vectors always give identical scores.
#[derive(Debug, Clone)]
pub struct Scorer<C> {
    classifier: C,
}

impl<C: Classifier> Scorer<C> {
    /// # Errors
    /// `Error::VersionMismatch` if the classifier was trained on a different number of
    /// features than the running encoder produces.
    pub fn new(classifier: C) -> Result<Self> {
        if classifier.feature_count() != FEATURE_COUNT {
            return Err(Error::VersionMismatch {
                expected: format!("{} features ({})", FEATURE_COUNT, FEATURE_NAMES.join(", ")),
                found: format!("{} features", classifier.feature_count()),
            });
        }
        Ok(Self { classifier })
    }

    pub fn score(&self, vector: &FeatureVector) -> Score {
        let raw = self.classifier.predict_probability(&vector.to_array());
        let probability = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        Score {
            probability,
            label: probability >= DECISION_THRESHOLD,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}
