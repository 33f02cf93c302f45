//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Clause boosts and query construction settings.
    pub ranking: Option<RawRankingSettings>,
    /// Popularity curve settings.
    pub popularity: Option<RawPopularitySettings>,
    /// Analyzer bindings: analyzer name -> locale or list of locales.
    #[serde_as(as = "Option<BTreeMap<_, OneOrMany<_>>>")]
    pub analyzers: Option<BTreeMap<String, Vec<String>>>,
}

/// Raw ranking settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRankingSettings {
    /// Constant score for an exact name match in the display locale.
    pub name_exact_boost: Option<f32>,
    /// Constant score for a sloppy phrase match on the name.
    pub name_phrase_boost: Option<f32>,
    /// Constant score per query token found in the name.
    pub name_match_boost: Option<f32>,
    /// Constant score per query token fuzzily found in the name.
    pub name_fuzzy_boost: Option<f32>,
    /// Constant score when the final query token prefixes a name token.
    pub name_prefix_boost: Option<f32>,
    /// Constant score per part of a split compound query token found in the name.
    pub name_compound_boost: Option<f32>,
    /// Multiplier on the BM25 score of summary matches.
    pub summary_boost: Option<f32>,
    /// Multiplier on the BM25 score of description matches.
    pub description_boost: Option<f32>,
    /// Word reordering tolerance of the phrase clause.
    pub phrase_slop: Option<u32>,
    /// Maximum edit distance for fuzzy name matching.
    pub fuzzy_distance: Option<u8>,
    /// Minimum length of the final token for prefix matching.
    pub prefix_min_length: Option<usize>,
    /// Exact matches score at least this multiple of the best non-exact score.
    pub exact_precedence_margin: Option<f32>,
    /// Candidates kept after popularity-weighted selection, on top of exact matches.
    pub candidate_limit: Option<usize>,
    /// Maximum results returned.
    pub limit: Option<usize>,
}

/// Raw popularity curve settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPopularitySettings {
    /// Scale applied to the log curve.
    pub weight: Option<f32>,
    /// Power applied to the log of the popularity signal.
    pub exponent: Option<f32>,
    /// Smallest factor any document can receive.
    pub floor: Option<f32>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// This is used during discovery to stop traversal at root configs.
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
