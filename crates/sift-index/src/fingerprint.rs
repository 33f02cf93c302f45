//! Ranking fingerprint.
//!
//! A hash of every parameter that changes scores. Score values recorded as regression
//! fixtures are only meaningful for the fingerprint they were recorded under.
//!
//! Parameters in the fingerprint:
//! - Scoring version (internal, bumped when the scoring formula changes)
//! - Clause boosts, phrase slop, fuzzy distance and prefix length
//! - Exact precedence margin and candidate limit
//! - Popularity curve
//! - Analyzer bindings
//!
//! The result limit only truncates and is not part of the fingerprint.

use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};

use sift_config::Config;
use siphasher::sip::SipHasher24;

/// Current scoring version. Bump this when clause compilation or combination changes.
pub const SCORING_VERSION: u32 = 2;

/// Parameters that affect scores, with floats stored by bit pattern.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ScoringParameters {
    /// Scoring version.
    pub scoring_version: u32,
    /// Clause boosts in plan order.
    pub boosts: [u32; 8],
    /// Phrase slop.
    pub phrase_slop: u32,
    /// Maximum fuzzy edit distance.
    pub fuzzy_distance: u8,
    /// Minimum prefix length.
    pub prefix_min_length: usize,
    /// Exact precedence margin.
    pub exact_precedence_margin: u32,
    /// Candidates kept after selection.
    pub candidate_limit: usize,
    /// Popularity weight, exponent and floor.
    pub popularity: [u32; 3],
    /// Locale -> analyzer.
    pub bindings: BTreeMap<String, String>,
}

impl ScoringParameters {
    /// Extracts the scoring parameters from a config.
    pub fn from_config(config: &Config) -> Self {
        let ranking = &config.ranking;
        let popularity = &config.popularity;
        Self {
            scoring_version: SCORING_VERSION,
            boosts: [
                ranking.name_exact_boost.to_bits(),
                ranking.name_phrase_boost.to_bits(),
                ranking.name_match_boost.to_bits(),
                ranking.name_fuzzy_boost.to_bits(),
                ranking.name_prefix_boost.to_bits(),
                ranking.name_compound_boost.to_bits(),
                ranking.summary_boost.to_bits(),
                ranking.description_boost.to_bits(),
            ],
            phrase_slop: ranking.phrase_slop,
            fuzzy_distance: ranking.fuzzy_distance,
            prefix_min_length: ranking.prefix_min_length,
            exact_precedence_margin: ranking.exact_precedence_margin.to_bits(),
            candidate_limit: ranking.candidate_limit,
            popularity: [
                popularity.weight.to_bits(),
                popularity.exponent.to_bits(),
                popularity.floor.to_bits(),
            ],
            bindings: config.analyzers.bindings.clone(),
        }
    }

    /// Computes the hash of the parameters.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = SipHasher24::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Computes the hash and returns it as a hex string.
    pub fn hash_string(&self) -> String {
        format!("{:016x}", self.compute_hash())
    }
}

/// Computes the ranking fingerprint of a config.
pub fn compute_fingerprint(config: &Config) -> String {
    ScoringParameters::from_config(config).hash_string()
}

#[cfg(test)]
mod tests {
    use sift_config::{PopularitySettings, RankingSettings};

    use super::*;

    #[test]
    fn same_config_same_fingerprint() {
        assert_eq!(
            compute_fingerprint(&Config::default()),
            compute_fingerprint(&Config::default())
        );
    }

    #[test]
    fn fingerprint_is_sixteen_hex_digits() {
        let fingerprint = compute_fingerprint(&Config::default());
        assert_eq!(fingerprint.len(), 16);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn boost_change_changes_fingerprint() {
        let config = Config {
            ranking: RankingSettings {
                name_fuzzy_boost: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_ne!(
            compute_fingerprint(&config),
            compute_fingerprint(&Config::default())
        );
    }

    #[test]
    fn popularity_change_changes_fingerprint() {
        let config = Config {
            popularity: PopularitySettings {
                exponent: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_ne!(
            compute_fingerprint(&config),
            compute_fingerprint(&Config::default())
        );
    }

    #[test]
    fn binding_change_changes_fingerprint() {
        let mut config = Config::default();
        config.analyzers.bindings.remove("fr");
        assert_ne!(
            compute_fingerprint(&config),
            compute_fingerprint(&Config::default())
        );
    }

    #[test]
    fn limit_does_not_change_fingerprint() {
        let config = Config {
            ranking: RankingSettings {
                limit: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            compute_fingerprint(&config),
            compute_fingerprint(&Config::default())
        );
    }
}
