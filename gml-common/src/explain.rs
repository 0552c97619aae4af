//! Deterministic explanations for scored entries
//!
//! Each factor is chosen by fixed threshold bands over the entry's raw attributes, not
//! over the encoded vector, so the text stays readable regardless of how the genre was
//! coded. The verdict depends on the probability alone.

use crate::genre::Genre;
use crate::records::EnrichedEntry;
use serde::{Deserialize, Serialize};

/// Chart peak tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakTier {
    Top5,
    Top10,
    Top20,
    Lower,
}

impl PeakTier {
    pub fn for_position(peak_position: u32) -> Self {
        match peak_position {
            0..=5 => PeakTier::Top5,
            6..=10 => PeakTier::Top10,
            11..=20 => PeakTier::Top20,
            _ => PeakTier::Lower,
        }
    }
}

/// Chart run tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTier {
    Extended,
    Solid,
    Brief,
}

impl RunTier {
    pub fn for_weeks(weeks_on_chart: u32) -> Self {
        if weeks_on_chart >= 20 {
            RunTier::Extended
        } else if weeks_on_chart >= 10 {
            RunTier::Solid
        } else {
            RunTier::Brief
        }
    }
}

/// One independent statement of an explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum Factor {
    Peak { tier: PeakTier },
    ChartRun { tier: RunTier },
    Winner { wins: u32 },
    Nominee { nominations: u32 },
    NoRecognition,
    Genre { genre: Genre, historically_strong: bool },
}

impl Factor {
    pub fn describe(&self) -> String {
        match self {
            Factor::Peak { tier } => match tier {
                PeakTier::Top5 => "Top 5 hit - strong chart performance".to_string(),
                PeakTier::Top10 => "Top 10 hit - good chart performance".to_string(),
                PeakTier::Top20 => "Reached Top 20".to_string(),
                PeakTier::Lower => "Lower chart position may reduce chances".to_string(),
            },
            Factor::ChartRun { tier } => match tier {
                RunTier::Extended => {
                    "Extended chart run (20+ weeks) - shows longevity".to_string()
                }
                RunTier::Solid => "Solid chart presence (10+ weeks)".to_string(),
                RunTier::Brief => "Brief chart appearance".to_string(),
            },
            Factor::Winner { wins } => {
                format!("Grammy winner ({} {}) - proven track record", wins, plural(*wins, "win", "wins"))
            }
            Factor::Nominee { nominations } => format!(
                "Grammy nominee ({} {})",
                nominations,
                plural(*nominations, "nomination", "nominations")
            ),
            Factor::NoRecognition => "No prior Grammy recognition".to_string(),
            Factor::Genre {
                genre,
                historically_strong: true,
            } => format!("{} genre - historically strong Grammy presence", genre),
            Factor::Genre { genre, .. } => format!("{} genre", genre),
        }
    }
}

fn plural(count: u32, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Overall likelihood tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictBand {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl VerdictBand {
    /// Band for a probability; non-decreasing in `probability`
    pub fn for_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            VerdictBand::VeryHigh
        } else if probability >= 0.6 {
            VerdictBand::High
        } else if probability >= 0.4 {
            VerdictBand::Moderate
        } else if probability >= 0.2 {
            VerdictBand::Low
        } else {
            VerdictBand::VeryLow
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            VerdictBand::VeryHigh => {
                "Very High nomination likelihood - strong across all factors"
            }
            VerdictBand::High => "High nomination likelihood - favorable indicators",
            VerdictBand::Moderate => "Moderate nomination likelihood - mixed signals",
            VerdictBand::Low => "Low nomination likelihood - some challenges",
            VerdictBand::VeryLow => {
                "Very Low nomination likelihood - multiple limiting factors"
            }
        }
    }
}

/// Ordered factors plus the verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub factors: Vec<Factor>,
    pub verdict_band: VerdictBand,
}

impl Explanation {
    /// Factor statements in order
    pub fn statements(&self) -> Vec<String> {
        self.factors.iter().map(Factor::describe).collect()
    }

    pub fn verdict(&self) -> &'static str {
        self.verdict_band.summary()
    }
}

/// Explain an entry and its probability
///
/// Factor order: peak position, chart run, award history, genre.
pub fn explain(entry: &EnrichedEntry, probability: f64) -> Explanation {
    let history = if entry.prior_wins > 0 {
        Factor::Winner {
            wins: entry.prior_wins,
        }
    } else if entry.prior_nominations > 0 {
        Factor::Nominee {
            nominations: entry.prior_nominations,
        }
    } else {
        Factor::NoRecognition
    };

    Explanation {
        factors: vec![
            Factor::Peak {
                tier: PeakTier::for_position(entry.peak_position),
            },
            Factor::ChartRun {
                tier: RunTier::for_weeks(entry.weeks_on_chart),
            },
            history,
            Factor::Genre {
                genre: entry.genre,
                historically_strong: entry.genre.is_historically_strong(),
            },
        ],
        verdict_band: VerdictBand::for_probability(probability),
    }
}
