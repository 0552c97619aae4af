//! Prediction pipeline: enrich, encode, score, explain, rank
//!
//! `Predictor` bundles a verified scorer with the category mapping it was trained
//! against, plus the identity and genre rules used to enrich chart entries. It holds
//! no mutable state and is shared read-only across callers.

use crate::dataset::enrich_chart_record;
use crate::explain::{explain, VerdictBand};
use crate::features::{encode, CategoryMapping};
use crate::genre::CategoryInferencer;
use crate::history::HistoryIndex;
use crate::identity::IdentityResolver;
use crate::model::LogisticModel;
use crate::package::TrainedPackage;
use crate::records::{require_non_empty, ChartRecord, EnrichedEntry};
use crate::scorer::{Classifier, Scorer};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scored and explained entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub song_title: String,
    pub artist_name: String,
    pub current_rank: Option<u32>,
    pub probability: f64,
    pub label: bool,
    pub explanation: Vec<String>,
    pub verdict_band: VerdictBand,
    pub verdict: String,
}

pub struct Predictor<C = LogisticModel> {
    scorer: Scorer<C>,
    mapping: CategoryMapping,
    resolver: Box<dyn IdentityResolver>,
    inferencer: CategoryInferencer,
}

impl Predictor<LogisticModel> {
    /// Build from a trained package; the package is verified first
    pub fn from_package(
        package: TrainedPackage,
        resolver: Box<dyn IdentityResolver>,
        inferencer: CategoryInferencer,
    ) -> Result<Self> {
        let (scorer, mapping) = package.into_scorer()?;
        Ok(Self::new(scorer, mapping, resolver, inferencer))
    }
}

impl<C: Classifier> Predictor<C> {
    pub fn new(
        scorer: Scorer<C>,
        mapping: CategoryMapping,
        resolver: Box<dyn IdentityResolver>,
        inferencer: CategoryInferencer,
    ) -> Self {
        Self {
            scorer,
            mapping,
            resolver,
            inferencer,
        }
    }

    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }

    /// Score and explain one already-enriched entry
    ///
    /// # Errors
    /// `Error::InvalidInput` for a non-positive peak or chart run,
    /// `Error::UnknownCategory` if the entry's genre is absent from the mapping.
    pub fn predict_entry(&self, entry: &EnrichedEntry) -> Result<Prediction> {
        entry.validate()?;
        let vector = encode(entry, &self.mapping)?;
        let score = self.scorer.score(&vector);
        let explanation = explain(entry, score.probability);

        debug!(
            song = %entry.song_title,
            artist = %entry.artist_name,
            probability = score.probability,
            "Scored entry"
        );

        Ok(Prediction {
            song_title: entry.song_title.clone(),
            artist_name: entry.artist_name.clone(),
            current_rank: entry.current_rank,
            probability: score.probability,
            label: score.label,
            explanation: explanation.statements(),
            verdict_band: explanation.verdict_band,
            verdict: explanation.verdict().to_string(),
        })
    }

    /// Enrich chart entries with full award history and rank them
    ///
    /// Sorted by probability, highest first; equal probabilities keep input order.
    ///
    /// # Errors
    /// `Error::MissingData` for an empty chart list, `Error::InvalidInput` for an
    /// invalid chart record, `Error::UnknownCategory` from encoding.
    pub fn predict_current(
        &self,
        charts: &[ChartRecord],
        index: &HistoryIndex,
    ) -> Result<Vec<Prediction>> {
        require_non_empty(charts, "chart data")?;

        let mut predictions = charts
            .iter()
            .map(|chart| {
                chart.validate()?;
                let (entry, _) =
                    enrich_chart_record(chart, index, self.resolver.as_ref(), &self.inferencer);
                self.predict_entry(&entry)
            })
            .collect::<Result<Vec<_>>>()?;

        predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(predictions)
    }

    /// Predictions for chart entries whose song title and/or artist name match exactly
    ///
    /// # Errors
    /// `Error::InvalidInput` if neither a song title nor an artist name is given.
    pub fn lookup(
        &self,
        charts: &[ChartRecord],
        index: &HistoryIndex,
        song_title: Option<&str>,
        artist_name: Option<&str>,
    ) -> Result<Vec<Prediction>> {
        if song_title.is_none() && artist_name.is_none() {
            return Err(Error::InvalidInput(
                "lookup needs a song title or an artist name".to_string(),
            ));
        }

        let matches: Vec<ChartRecord> = charts
            .iter()
            .filter(|c| song_title.map_or(true, |s| c.song_title == s))
            .filter(|c| artist_name.map_or(true, |a| c.artist_name == a))
            .cloned()
            .collect();

        if matches.is_empty() {
            return Ok(Vec::new());
        }
        self.predict_current(&matches, index)
    }
}
