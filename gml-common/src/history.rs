//! Per-artist award history with a strict temporal cutoff
//!
//! Training rows are historical nominations: the history attached to a row for year
//! Y may only count awards from years strictly before Y, otherwise the model learns
//! from its own target. Live chart entries have no natural year; for them the cutoff
//! sits just past the latest known award year, so every record of the artist counts.

use crate::identity::{IdentityResolver, MatchKey};
use crate::records::AwardRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Point in time the history is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePoint {
    /// Historical row: count only awards with `year < Y`
    Year(i32),
    /// Current chart entry: count every known award
    Live,
}

impl ReferencePoint {
    /// Concrete cutoff year for this reference against a set of award years
    pub fn cutoff_year<I>(self, known_years: I) -> i32
    where
        I: IntoIterator<Item = i32>,
    {
        match self {
            ReferencePoint::Year(year) => year,
            ReferencePoint::Live => live_cutoff(known_years.into_iter().max()),
        }
    }
}

fn live_cutoff(latest_year: Option<i32>) -> i32 {
    latest_year.map_or(i32::MAX, |year| year.saturating_add(1))
}

/// Prior nominations and wins of one artist before a reference year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistHistory {
    pub match_key: MatchKey,
    pub reference_year: i32,
    pub prior_nominations: u32,
    pub prior_wins: u32,
}

/// Count the artist's awards strictly before the reference point
///
/// An empty key (missing or all-punctuation name) never matches any award. Scans the
/// whole collection. For many lookups against the same collection, build a
/// [`HistoryIndex`] once instead.
pub fn aggregate(
    artist_key: &MatchKey,
    reference: ReferencePoint,
    awards: &[AwardRecord],
    resolver: &dyn IdentityResolver,
) -> ArtistHistory {
    let reference_year = reference.cutoff_year(awards.iter().map(|a| a.year));

    let mut prior_nominations = 0;
    let mut prior_wins = 0;
    for award in awards {
        if artist_key.is_empty() || award.year >= reference_year {
            continue;
        }
        if &resolver.resolve_identity(&award.artist_name) != artist_key {
            continue;
        }
        if award.is_nominated {
            prior_nominations += 1;
        }
        if award.is_winner {
            prior_wins += 1;
        }
    }

    ArtistHistory {
        match_key: artist_key.clone(),
        reference_year,
        prior_nominations,
        prior_wins,
    }
}

#[derive(Debug, Clone)]
struct IndexedAward {
    year: i32,
    category: String,
    is_nominated: bool,
    is_winner: bool,
}

/// Award history grouped by match key, built once per collection
///
/// Produces exactly the same counts as [`aggregate`]; the live cutoff is computed over
/// the whole collection, not per artist.
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    by_artist: HashMap<MatchKey, Vec<IndexedAward>>,
    latest_year: Option<i32>,
    record_count: usize,
}

impl HistoryIndex {
    pub fn build(awards: &[AwardRecord], resolver: &dyn IdentityResolver) -> Self {
        let mut by_artist: HashMap<MatchKey, Vec<IndexedAward>> = HashMap::new();
        let mut anonymous = 0usize;
        for award in awards {
            let key = resolver.resolve_identity(&award.artist_name);
            if key.is_empty() {
                anonymous += 1;
                continue;
            }
            by_artist
                .entry(key)
                .or_default()
                .push(IndexedAward {
                    year: award.year,
                    category: award.category.clone(),
                    is_nominated: award.is_nominated,
                    is_winner: award.is_winner,
                });
        }

        let latest_year = awards.iter().map(|a| a.year).max();
        debug!(
            artists = by_artist.len(),
            records = awards.len(),
            anonymous,
            "Built award history index"
        );

        Self {
            by_artist,
            latest_year,
            record_count: awards.len(),
        }
    }

    /// History of `key` before `reference`
    pub fn history(&self, key: &MatchKey, reference: ReferencePoint) -> ArtistHistory {
        let reference_year = match reference {
            ReferencePoint::Year(year) => year,
            ReferencePoint::Live => live_cutoff(self.latest_year),
        };

        let (prior_nominations, prior_wins) = self
            .by_artist
            .get(key)
            .map(|awards| {
                awards
                    .iter()
                    .filter(|a| a.year < reference_year)
                    .fold((0, 0), |(noms, wins), a| {
                        (noms + a.is_nominated as u32, wins + a.is_winner as u32)
                    })
            })
            .unwrap_or((0, 0));

        ArtistHistory {
            match_key: key.clone(),
            reference_year,
            prior_nominations,
            prior_wins,
        }
    }

    /// Award categories of `key` in first-appearance order (all years)
    pub fn categories<'a>(&'a self, key: &MatchKey) -> impl Iterator<Item = &'a str> + 'a {
        self.by_artist
            .get(key)
            .into_iter()
            .flatten()
            .map(|a| a.category.as_str())
    }

    pub fn contains(&self, key: &MatchKey) -> bool {
        self.by_artist.contains_key(key)
    }

    pub fn artist_count(&self) -> usize {
        self.by_artist.len()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.latest_year
    }
}
