//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence.
//!
//! Every parameter that influences a ranking score lives here so that pinned-score
//! regression fixtures can be tied to one explicit configuration.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path};
pub use error::ConfigError;
pub use merge::{ParsedConfig, UNBOUND_ANALYZER, merge_configs};
pub use parse::{
    RawConfig, RawPopularitySettings, RawRankingSettings, parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Locale to analyzer bindings used when no configuration overrides them.
///
/// Analyzer names are stemmer languages understood by the index crate.
pub const DEFAULT_ANALYZER_BINDINGS: &[(&str, &str)] = &[
    ("ar", "arabic"),
    ("da", "danish"),
    ("de", "german"),
    ("el", "greek"),
    ("en-CA", "english"),
    ("en-GB", "english"),
    ("en-US", "english"),
    ("es", "spanish"),
    ("fi", "finnish"),
    ("fr", "french"),
    ("hu", "hungarian"),
    ("it", "italian"),
    ("nb-NO", "norwegian"),
    ("nl", "dutch"),
    ("nn-NO", "norwegian"),
    ("pt-BR", "portuguese"),
    ("pt-PT", "portuguese"),
    ("ro", "romanian"),
    ("ru", "russian"),
    ("sv-SE", "swedish"),
    ("ta", "tamil"),
    ("tr", "turkish"),
];

/// Top-level merged configuration for sift.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Clause boosts and query construction settings.
    pub ranking: RankingSettings,
    /// Popularity curve settings.
    pub popularity: PopularitySettings,
    /// Locale to analyzer bindings.
    pub analyzers: AnalyzerSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Checks the configuration for settings that are legal but likely to misrank.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// Analyzer bindings are grouped by analyzer, the same shape a `.sift.toml` uses.
    pub fn settings_to_toml(&self) -> Result<String, toml::ser::Error> {
        let serializable = SerializableSettings {
            ranking: self.ranking.clone(),
            popularity: self.popularity.clone(),
            analyzers: self.analyzers.grouped(),
        };
        toml::to_string_pretty(&serializable)
    }
}

/// Clause boosts and query construction settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Constant score for an exact name match in the display locale.
    pub name_exact_boost: f32,
    /// Constant score for a sloppy phrase match on the name.
    pub name_phrase_boost: f32,
    /// Constant score per query token found in the name.
    pub name_match_boost: f32,
    /// Constant score per query token fuzzily found in the name.
    pub name_fuzzy_boost: f32,
    /// Constant score when the final query token prefixes a name token.
    pub name_prefix_boost: f32,
    /// Constant score per part of a split compound query token found in the name.
    pub name_compound_boost: f32,
    /// Multiplier on the BM25 score of summary matches.
    pub summary_boost: f32,
    /// Multiplier on the BM25 score of description matches.
    pub description_boost: f32,
    /// Word reordering tolerance of the phrase clause.
    pub phrase_slop: u32,
    /// Maximum edit distance for fuzzy name matching (0 disables fuzzy matching).
    pub fuzzy_distance: u8,
    /// Minimum length of the final token for prefix matching.
    pub prefix_min_length: usize,
    /// Exact matches score at least this multiple of the best non-exact score.
    pub exact_precedence_margin: f32,
    /// Candidates kept after popularity-weighted selection, on top of exact matches.
    pub candidate_limit: usize,
    /// Maximum results returned.
    pub limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            name_exact_boost: 100.0,
            name_phrase_boost: 12.0,
            name_match_boost: 4.0,
            name_fuzzy_boost: 1.0,
            name_prefix_boost: 1.5,
            name_compound_boost: 0.5,
            summary_boost: 0.02,
            description_boost: 0.01,
            phrase_slop: 1,
            fuzzy_distance: 2,
            prefix_min_length: 3,
            exact_precedence_margin: 10.0,
            candidate_limit: 1000,
            limit: 25,
        }
    }
}

/// Popularity curve: `max(floor, weight * log10(2 + signal) ^ exponent)`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopularitySettings {
    /// Scale applied to the log curve.
    pub weight: f32,
    /// Power applied to the log of the popularity signal.
    pub exponent: f32,
    /// Smallest factor any document can receive.
    pub floor: f32,
}

impl Default for PopularitySettings {
    fn default() -> Self {
        Self {
            weight: 1.0,
            exponent: 2.0,
            floor: 0.1,
        }
    }
}

/// Locale to analyzer bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Locale -> analyzer name.
    pub bindings: BTreeMap<String, String>,
}

impl AnalyzerSettings {
    /// Returns the bindings grouped by analyzer, locales sorted.
    ///
    /// Default locales that have been unbound are listed under `default` so the table
    /// reproduces these bindings when merged onto the defaults again.
    pub fn grouped(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (locale, analyzer) in &self.bindings {
            grouped
                .entry(analyzer.clone())
                .or_default()
                .push(locale.clone());
        }
        for (locale, _) in DEFAULT_ANALYZER_BINDINGS {
            if !self.bindings.contains_key(*locale) {
                grouped
                    .entry(UNBOUND_ANALYZER.to_string())
                    .or_default()
                    .push((*locale).to_string());
            }
        }
        grouped
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            bindings: DEFAULT_ANALYZER_BINDINGS
                .iter()
                .map(|(locale, analyzer)| ((*locale).to_string(), (*analyzer).to_string()))
                .collect(),
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Ranking settings.
    ranking: RankingSettings,
    /// Popularity settings.
    popularity: PopularitySettings,
    /// Analyzer -> locales.
    analyzers: BTreeMap<String, Vec<String>>,
}
