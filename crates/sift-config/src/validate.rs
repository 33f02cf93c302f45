//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that are legal
//! but likely to produce a surprising ranking.

use std::fmt;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The exact-name clause does not outweigh the phrase clause.
    ExactBoostNotDominant {
        /// Configured exact boost.
        exact: f32,
        /// Configured phrase boost.
        phrase: f32,
    },
    /// A clause has a zero boost and never contributes.
    ClauseDisabled {
        /// Dotted key of the disabled clause boost.
        key: String,
    },
    /// Fuzzy matching is turned off.
    FuzzyDisabled,
    /// Fewer candidates are fetched per clause than results are returned.
    CandidateLimitBelowLimit {
        /// Candidates fetched per clause.
        candidate_limit: usize,
        /// Results returned.
        limit: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactBoostNotDominant { exact, phrase } => {
                write!(
                    f,
                    "name_exact_boost ({exact}) does not exceed name_phrase_boost ({phrase})"
                )
            }
            Self::ClauseDisabled { key } => {
                write!(f, "{key} is 0, the clause never contributes")
            }
            Self::FuzzyDisabled => write!(f, "fuzzy_distance is 0, typos will not match"),
            Self::CandidateLimitBelowLimit {
                candidate_limit,
                limit,
            } => {
                write!(
                    f,
                    "candidate_limit ({candidate_limit}) is below limit ({limit})"
                )
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let ranking = &config.ranking;

    if ranking.name_exact_boost <= ranking.name_phrase_boost {
        warnings.push(ConfigWarning::ExactBoostNotDominant {
            exact: ranking.name_exact_boost,
            phrase: ranking.name_phrase_boost,
        });
    }

    let boosts = [
        ("ranking.name_exact_boost", ranking.name_exact_boost),
        ("ranking.name_phrase_boost", ranking.name_phrase_boost),
        ("ranking.name_match_boost", ranking.name_match_boost),
        ("ranking.name_fuzzy_boost", ranking.name_fuzzy_boost),
        ("ranking.name_prefix_boost", ranking.name_prefix_boost),
        ("ranking.name_compound_boost", ranking.name_compound_boost),
        ("ranking.summary_boost", ranking.summary_boost),
        ("ranking.description_boost", ranking.description_boost),
    ];
    for (key, value) in boosts {
        if value == 0.0 {
            warnings.push(ConfigWarning::ClauseDisabled {
                key: key.to_string(),
            });
        }
    }

    if ranking.fuzzy_distance == 0 {
        warnings.push(ConfigWarning::FuzzyDisabled);
    }

    if ranking.candidate_limit < ranking.limit {
        warnings.push(ConfigWarning::CandidateLimitBelowLimit {
            candidate_limit: ranking.candidate_limit,
            limit: ranking.limit,
        });
    }

    warnings
}
