//! Training-set assembly
//!
//! Three kinds of rows:
//! - historical award rows (labeled by `is_nominated`), history cut off strictly
//!   before the award year;
//! - a fixed set of synthetic non-nominated chart entries, the negative-example policy;
//! - current chart entries (unlabeled), history over every known award.
//!
//! Historical rows have no chart statistics; those are imputed. Null rates are
//! measured before imputation and reported as non-fatal data-quality warnings.

use crate::genre::{CategoryInferencer, Genre, GenreSource};
use crate::history::{HistoryIndex, ReferencePoint};
use crate::identity::IdentityResolver;
use crate::records::{require_non_empty, AwardRecord, ChartRecord, EnrichedEntry};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Where a row of the dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    AwardHistorical,
    SyntheticNegative,
    ChartCurrent,
}

/// A labeled row of the training corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub entry: EnrichedEntry,
    pub is_nominated: bool,
    pub source: DataSource,
    pub award_year: Option<i32>,
    pub award_category: Option<String>,
}

struct NegativeExample {
    song_title: &'static str,
    artist_name: &'static str,
    peak_position: u32,
    weeks_on_chart: u32,
    genre: Genre,
    prior_nominations: u32,
}

/// Plausible chart entries that were not nominated
///
/// Award history only contains nominees, so without these the corpus has no
/// negatives at all. They cover every genre the inferencer can emit, which keeps
/// the fitted category mapping complete.
const SYNTHETIC_NEGATIVES: [NegativeExample; 10] = [
    NegativeExample { song_title: "Song A", artist_name: "Artist A", peak_position: 50, weeks_on_chart: 5, genre: Genre::Pop, prior_nominations: 0 },
    NegativeExample { song_title: "Song B", artist_name: "Artist B", peak_position: 40, weeks_on_chart: 8, genre: Genre::Rap, prior_nominations: 0 },
    NegativeExample { song_title: "Song C", artist_name: "Artist C", peak_position: 30, weeks_on_chart: 10, genre: Genre::RnB, prior_nominations: 0 },
    NegativeExample { song_title: "Song D", artist_name: "Artist D", peak_position: 25, weeks_on_chart: 12, genre: Genre::Rock, prior_nominations: 0 },
    NegativeExample { song_title: "Song E", artist_name: "Artist E", peak_position: 20, weeks_on_chart: 15, genre: Genre::Pop, prior_nominations: 1 },
    NegativeExample { song_title: "Track 1", artist_name: "New Artist 1", peak_position: 60, weeks_on_chart: 3, genre: Genre::Pop, prior_nominations: 0 },
    NegativeExample { song_title: "Track 2", artist_name: "New Artist 2", peak_position: 45, weeks_on_chart: 6, genre: Genre::Country, prior_nominations: 0 },
    NegativeExample { song_title: "Track 3", artist_name: "New Artist 3", peak_position: 35, weeks_on_chart: 9, genre: Genre::Alternative, prior_nominations: 0 },
    NegativeExample { song_title: "Track 4", artist_name: "New Artist 4", peak_position: 55, weeks_on_chart: 4, genre: Genre::Rap, prior_nominations: 0 },
    NegativeExample { song_title: "Track 5", artist_name: "New Artist 5", peak_position: 70, weeks_on_chart: 2, genre: Genre::Pop, prior_nominations: 0 },
];

/// Synthetic negative examples, labeled not nominated
pub fn synthetic_negatives() -> Vec<TrainingExample> {
    SYNTHETIC_NEGATIVES
        .iter()
        .map(|neg| TrainingExample {
            entry: EnrichedEntry {
                song_title: neg.song_title.to_string(),
                artist_name: neg.artist_name.to_string(),
                peak_position: neg.peak_position,
                weeks_on_chart: neg.weeks_on_chart,
                genre: neg.genre,
                prior_nominations: neg.prior_nominations,
                prior_wins: 0,
                current_rank: None,
            },
            is_nominated: false,
            source: DataSource::SyntheticNegative,
            award_year: None,
            award_category: None,
        })
        .collect()
}

/// Chart statistics assumed for historical award rows
///
/// Nominated songs were, as a rule, hits: top 10 for about 20 weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imputation {
    pub peak_position: u32,
    pub weeks_on_chart: u32,
}

impl Default for Imputation {
    fn default() -> Self {
        Self {
            peak_position: 10,
            weeks_on_chart: 20,
        }
    }
}

/// Null rate of a core feature reached the configured threshold
///
/// Non-fatal: logged and reported, the pipeline continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub feature: String,
    pub null_rate: f64,
    pub threshold: f64,
}

/// Null rates of core features measured before imputation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub null_rates: Vec<(String, f64)>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Assembled dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Labeled rows (historical + synthetic negatives)
    pub training: Vec<TrainingExample>,
    /// Unlabeled current chart entries, in input order
    pub current: Vec<EnrichedEntry>,
    pub quality: QualityReport,
}

impl Dataset {
    pub fn count_by_source(&self, source: DataSource) -> usize {
        match source {
            DataSource::ChartCurrent => self.current.len(),
            _ => self.training.iter().filter(|ex| ex.source == source).count(),
        }
    }
}

/// Enrich one chart record with live history and inferred genre
///
/// The predictor uses this too, so training-time and scoring-time enrichment of chart
/// entries cannot diverge.
pub fn enrich_chart_record(
    record: &ChartRecord,
    index: &HistoryIndex,
    resolver: &dyn IdentityResolver,
    inferencer: &CategoryInferencer,
) -> (EnrichedEntry, GenreSource) {
    let key = resolver.resolve_identity(&record.artist_name);
    let history = index.history(&key, ReferencePoint::Live);
    let genre = inferencer.resolve_categories(index.categories(&key));

    let entry = EnrichedEntry {
        song_title: record.song_title.clone(),
        artist_name: record.artist_name.clone(),
        peak_position: record.peak_position,
        weeks_on_chart: record.weeks_on_chart,
        genre: genre.genre,
        prior_nominations: history.prior_nominations,
        prior_wins: history.prior_wins,
        current_rank: record.current_rank,
    };
    (entry, genre.source)
}

/// Missing-value tally per core feature
#[derive(Default)]
struct NullTally {
    rows: usize,
    peak_position: usize,
    weeks_on_chart: usize,
    genre: usize,
}

impl NullTally {
    fn record(&mut self, chart_stats_missing: bool, genre_source: Option<GenreSource>) {
        self.rows += 1;
        if chart_stats_missing {
            self.peak_position += 1;
            self.weeks_on_chart += 1;
        }
        if genre_source == Some(GenreSource::DefaultUnmatched) {
            self.genre += 1;
        }
    }

    fn report(&self, threshold: f64) -> QualityReport {
        let rate = |count: usize| {
            if self.rows == 0 {
                0.0
            } else {
                count as f64 / self.rows as f64
            }
        };
        let null_rates = vec![
            ("song_title".to_string(), 0.0),
            ("artist_name".to_string(), 0.0),
            ("peak_position".to_string(), rate(self.peak_position)),
            ("weeks_on_chart".to_string(), rate(self.weeks_on_chart)),
            ("genre".to_string(), rate(self.genre)),
            ("artist_past_grammy_noms".to_string(), 0.0),
            ("artist_past_grammy_wins".to_string(), 0.0),
        ];

        let warnings: Vec<DataQualityWarning> = null_rates
            .iter()
            .filter(|(_, null_rate)| *null_rate >= threshold)
            .map(|(feature, null_rate)| DataQualityWarning {
                feature: feature.clone(),
                null_rate: *null_rate,
                threshold,
            })
            .collect();

        for warning in &warnings {
            warn!(
                feature = %warning.feature,
                null_rate = %format!("{:.1}%", warning.null_rate * 100.0),
                threshold = %format!("{:.1}%", warning.threshold * 100.0),
                "Core feature null rate exceeds threshold before imputation"
            );
        }

        QualityReport {
            null_rates,
            warnings,
        }
    }
}

/// Builds the training dataset from award history and chart data
pub struct DatasetBuilder<'a> {
    resolver: &'a dyn IdentityResolver,
    inferencer: &'a CategoryInferencer,
    imputation: Imputation,
    null_rate_threshold: f64,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(resolver: &'a dyn IdentityResolver, inferencer: &'a CategoryInferencer) -> Self {
        Self {
            resolver,
            inferencer,
            imputation: Imputation::default(),
            null_rate_threshold: 0.10,
        }
    }

    pub fn with_imputation(mut self, imputation: Imputation) -> Self {
        self.imputation = imputation;
        self
    }

    pub fn with_null_rate_threshold(mut self, threshold: f64) -> Self {
        self.null_rate_threshold = threshold;
        self
    }

    /// Assemble labeled and current rows
    ///
    /// # Errors
    /// `Error::MissingData` if either source collection is empty.
    pub fn build(&self, awards: &[AwardRecord], charts: &[ChartRecord]) -> Result<Dataset> {
        require_non_empty(awards, "award history")?;
        require_non_empty(charts, "chart data")?;
        for chart in charts {
            chart.validate()?;
        }

        let index = HistoryIndex::build(awards, self.resolver);
        let mut tally = NullTally::default();

        let mut training = self.historical_examples(awards, &index, &mut tally);
        let historical = training.len();

        let negatives = synthetic_negatives();
        for _ in &negatives {
            tally.record(false, None);
        }
        training.extend(negatives);

        let mut current = Vec::with_capacity(charts.len());
        let mut unmatched_artists = 0;
        for chart in charts {
            let (entry, genre_source) =
                enrich_chart_record(chart, &index, self.resolver, self.inferencer);
            if genre_source == GenreSource::DefaultUnmatched {
                unmatched_artists += 1;
            }
            tally.record(false, Some(genre_source));
            current.push(entry);
        }

        let quality = tally.report(self.null_rate_threshold);

        info!(
            historical,
            synthetic_negatives = training.len() - historical,
            current = current.len(),
            unmatched_artists,
            "Assembled dataset"
        );

        Ok(Dataset {
            training,
            current,
            quality,
        })
    }

    fn historical_examples(
        &self,
        awards: &[AwardRecord],
        index: &HistoryIndex,
        tally: &mut NullTally,
    ) -> Vec<TrainingExample> {
        awards
            .iter()
            .filter_map(|award| {
                // Artist-only categories (e.g. Best New Artist) have no song to score
                let song_title = award.song_title.as_ref()?;

                let key = self.resolver.resolve_identity(&award.artist_name);
                let history = index.history(&key, ReferencePoint::Year(award.year));
                let genre = self.inferencer.resolve_categories(index.categories(&key));
                tally.record(true, Some(genre.source));

                Some(TrainingExample {
                    entry: EnrichedEntry {
                        song_title: song_title.clone(),
                        artist_name: award.artist_name.clone(),
                        peak_position: self.imputation.peak_position,
                        weeks_on_chart: self.imputation.weeks_on_chart,
                        genre: genre.genre,
                        prior_nominations: history.prior_nominations,
                        prior_wins: history.prior_wins,
                        current_rank: None,
                    },
                    is_nominated: award.is_nominated,
                    source: DataSource::AwardHistorical,
                    award_year: Some(award.year),
                    award_category: Some(award.category.clone()),
                })
            })
            .collect()
    }
}
