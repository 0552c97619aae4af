//! Source records and the enriched entry shared by training and scoring
//!
//! Award-history and chart records arrive from external collaborators as JSON
//! arrays. They are immutable once loaded; every later stage borrows them.

use crate::genre::Genre;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One row of award history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub year: i32,
    pub category: String,
    /// Absent for artist-only categories (e.g. Best New Artist)
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist_name: String,
    pub is_nominated: bool,
    pub is_winner: bool,
}

/// One currently charting song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub song_title: String,
    #[serde(default)]
    pub artist_name: String,
    pub peak_position: u32,
    pub weeks_on_chart: u32,
    #[serde(default)]
    pub current_rank: Option<u32>,
}

impl ChartRecord {
    /// Reject rows whose chart statistics are not positive
    pub fn validate(&self) -> Result<()> {
        check_chart_stats(
            &self.song_title,
            &self.artist_name,
            self.peak_position,
            self.weeks_on_chart,
        )
    }
}

fn check_chart_stats(song: &str, artist: &str, peak_position: u32, weeks_on_chart: u32) -> Result<()> {
    if peak_position == 0 {
        return Err(Error::InvalidInput(format!(
            "peak_position must be positive for '{}' by '{}'",
            song, artist
        )));
    }
    if weeks_on_chart == 0 {
        return Err(Error::InvalidInput(format!(
            "weeks_on_chart must be positive for '{}' by '{}'",
            song, artist
        )));
    }
    Ok(())
}

/// A song with every raw attribute the encoder and the explainer read
///
/// Built from a chart record (live scoring) or an award record (training), after
/// history aggregation and genre inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    pub song_title: String,
    pub artist_name: String,
    pub peak_position: u32,
    pub weeks_on_chart: u32,
    pub genre: Genre,
    #[serde(alias = "artist_past_grammy_noms")]
    pub prior_nominations: u32,
    #[serde(alias = "artist_past_grammy_wins")]
    pub prior_wins: u32,
    #[serde(default)]
    pub current_rank: Option<u32>,
}

impl EnrichedEntry {
    /// Same chart-statistic checks as [`ChartRecord::validate`]
    pub fn validate(&self) -> Result<()> {
        check_chart_stats(
            &self.song_title,
            &self.artist_name,
            self.peak_position,
            self.weeks_on_chart,
        )
    }
}

/// Fail fast when a required source collection is empty
pub fn require_non_empty<T>(records: &[T], what: &str) -> Result<()> {
    if records.is_empty() {
        return Err(Error::MissingData(format!("{} is empty", what)));
    }
    Ok(())
}

fn load_json_array<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(Error::MissingData(format!(
            "{} not found at {}",
            what,
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let records: Vec<T> = serde_json::from_str(&content)?;
    require_non_empty(&records, what)?;
    info!("Loaded {} {} records from {}", records.len(), what, path.display());
    Ok(records)
}

/// Load award history from a JSON array file
pub fn load_award_records(path: &Path) -> Result<Vec<AwardRecord>> {
    load_json_array(path, "award history")
}

/// Load chart entries from a JSON array file, validating each row
pub fn load_chart_records(path: &Path) -> Result<Vec<ChartRecord>> {
    let records: Vec<ChartRecord> = load_json_array(path, "chart data")?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_record_without_song_title() {
        let json = r#"{"year": 2023, "category": "Best New Artist", "song_title": null,
            "artist_name": "Samara Joy", "is_nominated": true, "is_winner": true}"#;
        let record: AwardRecord = serde_json::from_str(json).unwrap();
        assert!(record.song_title.is_none());
        assert!(record.is_winner);
    }

    #[test]
    fn test_chart_record_rejects_zero_peak() {
        let record = ChartRecord {
            song_title: "Song".to_string(),
            artist_name: "Artist".to_string(),
            peak_position: 0,
            weeks_on_chart: 3,
            current_rank: None,
        };
        assert!(matches!(record.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_enriched_entry_accepts_legacy_history_names() {
        let json = r#"{"song_title": "Anti-Hero", "artist_name": "Taylor Swift",
            "peak_position": 1, "weeks_on_chart": 30, "genre": "Pop",
            "artist_past_grammy_noms": 46, "artist_past_grammy_wins": 12}"#;
        let entry: EnrichedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.prior_nominations, 46);
        assert_eq!(entry.prior_wins, 12);
        assert_eq!(entry.genre, Genre::Pop);
    }

    #[test]
    fn test_enriched_entry_rejects_zero_stats() {
        let json = r#"{"song_title": "Ghost", "artist_name": "Nobody",
            "peak_position": 0, "weeks_on_chart": 4, "genre": "Rock",
            "prior_nominations": 0, "prior_wins": 0}"#;
        let mut entry: EnrichedEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(entry.validate(), Err(Error::InvalidInput(_))));

        entry.peak_position = 12;
        entry.weeks_on_chart = 0;
        assert!(matches!(entry.validate(), Err(Error::InvalidInput(_))));

        entry.weeks_on_chart = 1;
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_require_non_empty() {
        let empty: Vec<AwardRecord> = Vec::new();
        assert!(matches!(
            require_non_empty(&empty, "award history"),
            Err(Error::MissingData(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_missing_data() {
        let result = load_award_records(Path::new("/nonexistent/gml/awards.json"));
        assert!(matches!(result, Err(Error::MissingData(_))));
    }
}
