//! Feature encoding shared by training and scoring
//!
//! The trainer and the predictor both call [`encode`] with the same
//! [`CategoryMapping`] value, which is what keeps the vectors they build identical.
//! The mapping is fit once over the labeled corpus and then only read.

use crate::dataset::TrainingExample;
use crate::records::EnrichedEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::info;

/// Number of features in a vector
pub const FEATURE_COUNT: usize = 5;

/// Feature order consumed by the classifier
///
/// Stored in every trained package; a package whose order differs is refused.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "peak_position",
    "weeks_on_chart",
    "artist_past_grammy_noms",
    "artist_past_grammy_wins",
    "genre_encoded",
];

/// Genre label → integer code, learned once per trained model
///
/// Codes follow sorted label order. The fingerprint identifies the generation so two
/// mappings can be told apart after a round trip through disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    codes: BTreeMap<String, u32>,
    fingerprint: String,
}

impl CategoryMapping {
    /// Build from labels; duplicates collapse, codes are assigned in sorted order
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes: BTreeMap<String, u32> =
            labels.into_iter().map(|l| (l.into(), 0)).collect();
        for (code, value) in codes.values_mut().enumerate() {
            *value = code as u32;
        }
        let fingerprint = compute_fingerprint(&codes);
        Self { codes, fingerprint }
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check a deserialized mapping: dense sorted codes and a matching fingerprint
    pub fn verify(&self) -> Result<()> {
        for (expected, code) in self.codes.values().enumerate() {
            if *code != expected as u32 {
                return Err(Error::VersionMismatch {
                    expected: format!("dense category codes 0..{}", self.codes.len()),
                    found: format!("code {} at position {}", code, expected),
                });
            }
        }
        let recomputed = compute_fingerprint(&self.codes);
        if recomputed != self.fingerprint {
            return Err(Error::VersionMismatch {
                expected: format!("category mapping fingerprint {}", recomputed),
                found: self.fingerprint.clone(),
            });
        }
        Ok(())
    }
}

fn compute_fingerprint(codes: &BTreeMap<String, u32>) -> String {
    let mut hasher = Sha256::new();
    for (label, code) in codes {
        hasher.update(label.as_bytes());
        hasher.update(b"=");
        hasher.update(code.to_string().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Fixed-order numeric representation of one entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub peak_position: f64,
    pub weeks_on_chart: f64,
    pub prior_nominations: f64,
    pub prior_wins: f64,
    pub genre_code: u32,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.peak_position,
            self.weeks_on_chart,
            self.prior_nominations,
            self.prior_wins,
            f64::from(self.genre_code),
        ]
    }
}

/// Fit the category mapping over the labeled training corpus
///
/// Called once per trained model.
pub fn fit(corpus: &[TrainingExample]) -> Result<CategoryMapping> {
    if corpus.is_empty() {
        return Err(Error::MissingData(
            "cannot fit category mapping on an empty training corpus".to_string(),
        ));
    }
    let mapping = CategoryMapping::from_labels(corpus.iter().map(|ex| ex.entry.genre.label()));
    info!(
        categories = ?mapping.labels().collect::<Vec<_>>(),
        fingerprint = %&mapping.fingerprint()[..12],
        "Fit category mapping"
    );
    Ok(mapping)
}

/// Encode an entry with a previously fit mapping
///
/// # Errors
/// `Error::UnknownCategory` if the entry's genre was absent when the mapping was fit.
/// Genre inference only emits labels the training corpus covers, so this signals the
/// two have drifted apart rather than a recoverable condition.
pub fn encode(entry: &EnrichedEntry, mapping: &CategoryMapping) -> Result<FeatureVector> {
    let label = entry.genre.label();
    let genre_code = mapping.code(label).ok_or_else(|| Error::UnknownCategory {
        label: label.to_string(),
        artist: entry.artist_name.clone(),
        song: entry.song_title.clone(),
    })?;

    Ok(FeatureVector {
        peak_position: f64::from(entry.peak_position),
        weeks_on_chart: f64::from(entry.weeks_on_chart),
        prior_nominations: f64::from(entry.prior_nominations),
        prior_wins: f64::from(entry.prior_wins),
        genre_code,
    })
}
