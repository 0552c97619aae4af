//! Artist identity: name normalization and pluggable identity resolution
//!
//! Both data sources credit artists as free text ("Taylor Swift feat. Ice Spice",
//! "TAYLOR SWIFT"). Records are joined on a [`MatchKey`], the canonical form of the
//! primary credited artist. Matching is exact on the key; differently-spelled names
//! stay distinct unless an alias table says otherwise.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Canonical artist key used to compare identities across sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tokens that introduce a secondary credited artist (after punctuation is stripped,
/// so "feat." and "ft." are covered too)
const COLLABORATION_MARKERS: &[&str] = &["feat", "featuring", "ft"];

fn is_collaboration_marker(raw_token: &str, stripped: &str) -> bool {
    raw_token == "&" || COLLABORATION_MARKERS.contains(&stripped)
}

/// Normalize an artist name into its match key
///
/// Lower-cases, drops everything from the first collaboration marker onward, strips
/// punctuation and collapses whitespace. A marker in leading position is kept as an
/// ordinary word so a name is never reduced to nothing by its own first token.
///
/// Idempotent: `normalize(normalize(x).as_str()) == normalize(x)`.
pub fn normalize(name: &str) -> MatchKey {
    let lowered = name.to_lowercase();
    let mut kept: Vec<String> = Vec::new();

    for token in lowered.split_whitespace() {
        let stripped: String = token
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();

        if !kept.is_empty() && is_collaboration_marker(token, &stripped) {
            break;
        }
        if !stripped.is_empty() {
            kept.push(stripped);
        }
    }

    MatchKey(kept.join(" "))
}

/// Normalize a possibly-missing name; missing yields the empty key
pub fn normalize_opt(name: Option<&str>) -> MatchKey {
    name.map(normalize).unwrap_or_default()
}

/// Strategy turning an artist name into the key used for joins
///
/// History aggregation, genre resolution and the predictor only see this trait, so a
/// stronger matcher can replace the default without touching them.
pub trait IdentityResolver: Send + Sync {
    fn resolve_identity(&self, name: &str) -> MatchKey;
}

/// Default resolver: exact comparison of normalized names
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactNormalizer;

impl IdentityResolver for ExactNormalizer {
    fn resolve_identity(&self, name: &str) -> MatchKey {
        normalize(name)
    }
}

/// Resolver that folds known alternate spellings onto one canonical key
///
/// Lookup is exact on normalized keys; this is a curated table, not fuzzy matching.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<MatchKey, MatchKey>,
}

impl AliasResolver {
    /// Build from `canonical name -> [alternate spellings]`
    ///
    /// # Errors
    /// Returns `Error::Config` if a canonical name is itself listed as an alias of a
    /// different artist, or one alias points at two canonical names. Either would make
    /// resolution order-dependent.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let canonical_keys: Vec<MatchKey> = table.keys().map(|name| normalize(name)).collect();
        let mut aliases: HashMap<MatchKey, MatchKey> = HashMap::new();

        for ((_, spellings), canonical) in table.iter().zip(canonical_keys.iter()) {
            for spelling in spellings {
                let alias = normalize(spelling);
                if alias.is_empty() || &alias == canonical {
                    continue;
                }
                if canonical_keys.contains(&alias) {
                    return Err(Error::Config(format!(
                        "alias '{}' is also a canonical artist name",
                        alias
                    )));
                }
                if let Some(previous) = aliases.insert(alias.clone(), canonical.clone()) {
                    if &previous != canonical {
                        return Err(Error::Config(format!(
                            "alias '{}' maps to both '{}' and '{}'",
                            alias, previous, canonical
                        )));
                    }
                }
            }
        }

        Ok(Self { aliases })
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl IdentityResolver for AliasResolver {
    fn resolve_identity(&self, name: &str) -> MatchKey {
        let key = normalize(name);
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_featuring_credit_keeps_primary_artist() {
        assert_eq!(normalize("Taylor Swift feat. Ice Spice").as_str(), "taylor swift");
        assert_eq!(normalize("Taylor Swift").as_str(), "taylor swift");
        assert_eq!(
            normalize("Taylor Swift feat. Ice Spice"),
            normalize("Taylor Swift")
        );
    }

    #[test]
    fn test_all_collaboration_markers() {
        for name in [
            "Drake featuring 21 Savage",
            "Drake feat 21 Savage",
            "Drake Feat. 21 Savage",
            "Drake ft 21 Savage",
            "Drake ft. 21 Savage",
            "Drake & 21 Savage",
            "Drake (feat. 21 Savage)",
        ] {
            assert_eq!(normalize(name).as_str(), "drake", "input: {}", name);
        }
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(normalize("  P!nk  ").as_str(), "pnk");
        assert_eq!(normalize("Tyler,   The Creator").as_str(), "tyler the creator");
        assert_eq!(normalize("Simon&Garfunkel").as_str(), "simongarfunkel");
    }

    #[test]
    fn test_leading_marker_is_an_ordinary_word() {
        assert_eq!(normalize("Feat Band").as_str(), "feat band");
        assert_eq!(normalize("& Friends").as_str(), "friends");
    }

    #[test]
    fn test_missing_name_is_empty_key() {
        assert!(normalize_opt(None).is_empty());
        assert!(normalize("").is_empty());
        assert!(normalize("!!!").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Taylor Swift feat. Ice Spice",
            "Feat Band",
            "& Friends",
            "A f.t. B",
            "SZA & Phoebe Bridgers",
            "Beyoncé",
            "Tyler,   The Creator",
            "AC/DC",
            "  ",
            "Post Malone ft.",
            "Ünïcödé   Ártist feat",
            "the weeknd x daft punk",
        ];
        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_alias_resolver_folds_spellings() {
        let mut table = BTreeMap::new();
        table.insert(
            "The Weeknd".to_string(),
            vec!["Weeknd".to_string(), "The Weeknd.".to_string()],
        );
        let resolver = AliasResolver::from_table(&table).unwrap();

        assert_eq!(resolver.resolve_identity("Weeknd").as_str(), "the weeknd");
        assert_eq!(
            resolver.resolve_identity("Weeknd feat. Daft Punk").as_str(),
            "the weeknd"
        );
        assert_eq!(resolver.resolve_identity("Adele").as_str(), "adele");
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_alias_resolver_rejects_chained_aliases() {
        let mut table = BTreeMap::new();
        table.insert("Artist A".to_string(), vec!["Artist B".to_string()]);
        table.insert("Artist B".to_string(), vec!["Artist C".to_string()]);
        assert!(matches!(
            AliasResolver::from_table(&table),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_exact_normalizer_matches_normalize() {
        let resolver = ExactNormalizer;
        assert_eq!(
            resolver.resolve_identity("Bad Bunny ft. Jhay Cortez"),
            normalize("Bad Bunny")
        );
    }
}
