//! Genre inference from free-text award categories
//!
//! Categories such as "Best Pop Duo/Group Performance" are reduced to one canonical
//! genre by an ordered keyword table. The table is data: rule order and the terminal
//! default are visible, testable, and replaceable.

use crate::identity::{IdentityResolver, MatchKey};
use crate::records::AwardRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical genre labels produced by the inferencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Pop,
    Rap,
    #[serde(rename = "R&B", alias = "RnB")]
    RnB,
    Rock,
    Country,
    Alternative,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Pop,
        Genre::Rap,
        Genre::RnB,
        Genre::Rock,
        Genre::Country,
        Genre::Alternative,
    ];

    /// Label used in the category mapping and in explanations
    pub fn label(self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rap => "Rap",
            Genre::RnB => "R&B",
            Genre::Rock => "Rock",
            Genre::Country => "Country",
            Genre::Alternative => "Alternative",
        }
    }

    /// Genres with a historically strong presence among nominations
    pub fn is_historically_strong(self) -> bool {
        matches!(self, Genre::Pop | Genre::RnB | Genre::Rap)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the rule table: any keyword present selects the genre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreRule {
    pub keywords: Vec<String>,
    pub genre: Genre,
}

impl GenreRule {
    pub fn new(keywords: &[&str], genre: Genre) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            genre,
        }
    }

    fn matches(&self, lowered_text: &str) -> bool {
        self.keywords.iter().any(|k| lowered_text.contains(k.as_str()))
    }
}

/// How an artist's genre was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreSource {
    /// A rule matched one of the artist's award categories
    Inferred,
    /// The artist has award history but no category matched any rule
    DefaultNoKeyword,
    /// The artist has no award history at all
    DefaultUnmatched,
}

/// Genre plus the path that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenreResolution {
    pub genre: Genre,
    pub source: GenreSource,
}

/// Ordered keyword table with a terminal default rule
///
/// Default table, in priority order:
/// pop → Pop; rap, hip hop, hip-hop → Rap; r&b, r & b → R&B; rock → Rock;
/// country → Country; alternative → Alternative; otherwise Pop.
///
/// Unmatched categories and artists without award history both land on the default;
/// [`GenreSource`] records which path was taken.
#[derive(Debug, Clone)]
pub struct CategoryInferencer {
    rules: Vec<GenreRule>,
    default: Genre,
}

impl Default for CategoryInferencer {
    fn default() -> Self {
        Self::new(
            vec![
                GenreRule::new(&["pop"], Genre::Pop),
                GenreRule::new(&["rap", "hip hop", "hip-hop"], Genre::Rap),
                GenreRule::new(&["r&b", "r & b"], Genre::RnB),
                GenreRule::new(&["rock"], Genre::Rock),
                GenreRule::new(&["country"], Genre::Country),
                GenreRule::new(&["alternative"], Genre::Alternative),
            ],
            Genre::Pop,
        )
    }
}

impl CategoryInferencer {
    pub fn new(rules: Vec<GenreRule>, default: Genre) -> Self {
        Self { rules, default }
    }

    pub fn rules(&self) -> &[GenreRule] {
        &self.rules
    }

    pub fn default_genre(&self) -> Genre {
        self.default
    }

    /// First rule whose keyword occurs in `category`, without applying the default
    pub fn classify(&self, category: &str) -> Option<Genre> {
        let lowered = category.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.genre)
    }

    /// Genre for a category string, falling back to the default rule
    pub fn infer(&self, category: &str) -> Genre {
        self.classify(category).unwrap_or(self.default)
    }

    /// Decide a genre from an artist's award categories, in first-appearance order
    ///
    /// The first category that any rule matches decides. No categories at all and no
    /// matching category both fall back to the default, through different sources.
    pub fn resolve_categories<'a, I>(&self, categories: I) -> GenreResolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut saw_any = false;
        for category in categories {
            saw_any = true;
            if let Some(genre) = self.classify(category) {
                return GenreResolution {
                    genre,
                    source: GenreSource::Inferred,
                };
            }
        }

        GenreResolution {
            genre: self.default,
            source: if saw_any {
                GenreSource::DefaultNoKeyword
            } else {
                GenreSource::DefaultUnmatched
            },
        }
    }

    /// Resolve the genre of the artist identified by `key` from the award history
    ///
    /// An empty key matches no award and resolves through `DefaultUnmatched`.
    pub fn resolve_for_artist(
        &self,
        key: &MatchKey,
        awards: &[AwardRecord],
        resolver: &dyn IdentityResolver,
    ) -> GenreResolution {
        self.resolve_categories(
            awards
                .iter()
                .filter(|_| !key.is_empty())
                .filter(|award| &resolver.resolve_identity(&award.artist_name) == key)
                .map(|award| award.category.as_str()),
        )
    }
}
