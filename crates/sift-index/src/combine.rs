//! Score combination: text relevance times popularity, with exact-match precedence.
//!
//! The final score of a document is `sum(clause scores) * popularity_factor(signal)`,
//! where `popularity_factor(s) = max(floor, weight * log10(2 + s) ^ exponent)`.
//! The curve is monotone and strongly sub-linear, so popularity separates documents with
//! similar text relevance without letting a huge audience override a clear name match.

use sift_config::{Config, PopularitySettings};

use crate::result::{ClauseScore, ScoredResult};

/// Offset inside the logarithm so a document with no users still gets a positive log.
const SIGNAL_OFFSET: f64 = 2.0;

/// Text score, popularity factor and their product for one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combined {
    /// Sum of clause scores.
    pub text: f32,
    /// Popularity multiplier.
    pub popularity: f32,
    /// `text * popularity`.
    pub score: f32,
}

/// Combines clause scores with popularity.
#[derive(Debug, Clone)]
pub struct ScoreCombiner {
    /// Popularity curve parameters.
    popularity: PopularitySettings,
    /// Exact matches score at least this multiple of the best non-exact score.
    exact_precedence_margin: f32,
}

impl ScoreCombiner {
    /// Creates a combiner.
    pub fn new(popularity: PopularitySettings, exact_precedence_margin: f32) -> Self {
        Self {
            popularity,
            exact_precedence_margin,
        }
    }

    /// Creates a combiner from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.popularity.clone(),
            config.ranking.exact_precedence_margin,
        )
    }

    /// Multiplier for a popularity signal.
    pub fn popularity_factor(&self, signal: u64) -> f32 {
        let PopularitySettings {
            weight,
            exponent,
            floor,
        } = self.popularity;
        let log = (signal as f64 + SIGNAL_OFFSET).log10();
        let factor = f64::from(weight) * log.powf(f64::from(exponent));
        factor.max(f64::from(floor)) as f32
    }

    /// Sums clause scores and applies the popularity factor.
    pub fn combine(&self, clauses: &[ClauseScore], signal: u64) -> Combined {
        let text: f32 = clauses.iter().map(|clause| clause.score).sum();
        let popularity = self.popularity_factor(signal);
        Combined {
            text,
            popularity,
            score: text * popularity,
        }
    }

    /// Lifts exact matches above everything else.
    ///
    /// When the weakest exact match does not score strictly above
    /// `margin * best non-exact score`, every exact match is scaled by the same factor so
    /// that it does. Relative order among exact matches is preserved.
    pub fn apply_exact_precedence(&self, results: &mut [ScoredResult]) {
        let best_other = results
            .iter()
            .filter(|r| !r.exact_match)
            .map(|r| r.score)
            .fold(0.0_f32, f32::max);
        if best_other <= 0.0 {
            return;
        }

        let Some(weakest_exact) = results
            .iter()
            .filter(|r| r.exact_match)
            .map(|r| r.score)
            .min_by(f32::total_cmp)
        else {
            return;
        };

        let required = (self.exact_precedence_margin * best_other).next_up();
        if weakest_exact >= required {
            return;
        }

        let lift = if weakest_exact > 0.0 {
            required / weakest_exact
        } else {
            1.0
        };
        for result in results.iter_mut().filter(|r| r.exact_match) {
            result.score = (result.score * lift).max(required);
        }
    }
}
