//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and rejecting out-of-range parameters.

use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    AnalyzerSettings, Config, ConfigError, PopularitySettings, RankingSettings,
    parse::{RawConfig, RawPopularitySettings, RawRankingSettings},
};

/// Analyzer name that removes a locale binding, sending it to the default analyzer.
pub const UNBOUND_ANALYZER: &str = "default";

/// Largest edit distance the fuzzy clause supports.
const MAX_FUZZY_DISTANCE: u8 = 2;

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Analyzer bindings: merged per locale onto the defaults, first definition wins
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let ranking = merge_ranking_settings(configs);
    let popularity = merge_popularity_settings(configs);
    check_ranking(&ranking)?;
    check_popularity(&popularity)?;
    let analyzers = merge_analyzers(configs)?;
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(PathBuf::from);

    Ok(Config {
        ranking,
        popularity,
        analyzers,
        config_root,
    })
}

/// Merges ranking settings, taking first defined value for each field.
fn merge_ranking_settings(configs: &[ParsedConfig]) -> RankingSettings {
    let mut result = RankingSettings::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref ranking) = parsed.config.ranking {
            apply_raw_ranking(&mut result, ranking);
        }
    }

    result
}

/// Applies raw ranking settings to result, overwriting any present values.
fn apply_raw_ranking(result: &mut RankingSettings, raw: &RawRankingSettings) {
    if let Some(v) = raw.name_exact_boost {
        result.name_exact_boost = v;
    }
    if let Some(v) = raw.name_phrase_boost {
        result.name_phrase_boost = v;
    }
    if let Some(v) = raw.name_match_boost {
        result.name_match_boost = v;
    }
    if let Some(v) = raw.name_fuzzy_boost {
        result.name_fuzzy_boost = v;
    }
    if let Some(v) = raw.name_prefix_boost {
        result.name_prefix_boost = v;
    }
    if let Some(v) = raw.name_compound_boost {
        result.name_compound_boost = v;
    }
    if let Some(v) = raw.summary_boost {
        result.summary_boost = v;
    }
    if let Some(v) = raw.description_boost {
        result.description_boost = v;
    }
    if let Some(v) = raw.phrase_slop {
        result.phrase_slop = v;
    }
    if let Some(v) = raw.fuzzy_distance {
        result.fuzzy_distance = v;
    }
    if let Some(v) = raw.prefix_min_length {
        result.prefix_min_length = v;
    }
    if let Some(v) = raw.exact_precedence_margin {
        result.exact_precedence_margin = v;
    }
    if let Some(v) = raw.candidate_limit {
        result.candidate_limit = v;
    }
    if let Some(v) = raw.limit {
        result.limit = v;
    }
}

/// Merges popularity settings.
fn merge_popularity_settings(configs: &[ParsedConfig]) -> PopularitySettings {
    let mut result = PopularitySettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref popularity) = parsed.config.popularity {
            apply_raw_popularity(&mut result, popularity);
        }
    }

    result
}

/// Applies raw popularity settings to result.
fn apply_raw_popularity(result: &mut PopularitySettings, raw: &RawPopularitySettings) {
    if let Some(v) = raw.weight {
        result.weight = v;
    }
    if let Some(v) = raw.exponent {
        result.exponent = v;
    }
    if let Some(v) = raw.floor {
        result.floor = v;
    }
}

/// Rejects boosts and limits that cannot produce a meaningful ranking.
fn check_ranking(ranking: &RankingSettings) -> Result<(), ConfigError> {
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
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::invalid(
                key,
                format!("boost must be a finite non-negative number, got {value}"),
            ));
        }
    }

    if ranking.fuzzy_distance > MAX_FUZZY_DISTANCE {
        return Err(ConfigError::invalid(
            "ranking.fuzzy_distance",
            format!(
                "must be at most {MAX_FUZZY_DISTANCE}, got {}",
                ranking.fuzzy_distance
            ),
        ));
    }
    if !ranking.exact_precedence_margin.is_finite() || ranking.exact_precedence_margin <= 1.0 {
        return Err(ConfigError::invalid(
            "ranking.exact_precedence_margin",
            format!(
                "must be a finite number greater than 1, got {}",
                ranking.exact_precedence_margin
            ),
        ));
    }
    if ranking.limit == 0 {
        return Err(ConfigError::invalid("ranking.limit", "must be at least 1"));
    }
    if ranking.candidate_limit == 0 {
        return Err(ConfigError::invalid(
            "ranking.candidate_limit",
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Rejects popularity curves that are not monotone or not finite.
fn check_popularity(popularity: &PopularitySettings) -> Result<(), ConfigError> {
    let params = [
        ("popularity.weight", popularity.weight),
        ("popularity.exponent", popularity.exponent),
        ("popularity.floor", popularity.floor),
    ];
    for (key, value) in params {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::invalid(
                key,
                format!("must be a finite positive number, got {value}"),
            ));
        }
    }
    Ok(())
}

/// Merges analyzer bindings onto the defaults.
///
/// A locale listed under two analyzers in the same file is an error. Across files the
/// higher-precedence binding wins. Binding a locale to `default` removes it.
fn merge_analyzers(configs: &[ParsedConfig]) -> Result<AnalyzerSettings, ConfigError> {
    let mut result = AnalyzerSettings::default();

    for parsed in configs.iter().rev() {
        let Some(ref analyzers) = parsed.config.analyzers else {
            continue;
        };
        for (locale, analyzer) in file_bindings(analyzers)? {
            if analyzer == UNBOUND_ANALYZER {
                result.bindings.remove(&locale);
            } else {
                result.bindings.insert(locale, analyzer);
            }
        }
    }

    Ok(result)
}

/// Inverts one file's analyzer -> locales table, detecting duplicate locales.
fn file_bindings(
    analyzers: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut bindings: BTreeMap<String, String> = BTreeMap::new();
    for (analyzer, locales) in analyzers {
        for locale in locales {
            let locale = locale.trim();
            if locale.is_empty() {
                return Err(ConfigError::invalid(
                    &format!("analyzers.{analyzer}"),
                    "locale must not be empty",
                ));
            }
            if let Some(first) = bindings.get(locale)
                && first != analyzer
            {
                return Err(ConfigError::ConflictingBinding {
                    locale: locale.to_string(),
                    first: first.clone(),
                    second: analyzer.clone(),
                });
            }
            bindings.insert(locale.to_string(), analyzer.clone());
        }
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{parse::parse_config_str, test_support::ConfigTree};

    fn parsed(path: PathBuf, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path,
            config: parse_config_str(toml, Path::new("test")).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]).unwrap();
        assert_eq!(result.ranking, RankingSettings::default());
        assert!(result.config_root.is_none());
    }

    #[test]
    fn test_merge_single_config() {
        let test_dir = ConfigTree::new();
        let config = parsed(
            test_dir.path().join(".sift.toml"),
            r#"
[ranking]
limit = 10
summary_boost = 0.1
"#,
        );

        let result = merge_configs(&[config]).unwrap();
        assert_eq!(result.ranking.limit, 10);
        assert!((result.ranking.summary_boost - 0.1).abs() < f32::EPSILON);
        assert_eq!(result.ranking.phrase_slop, 1);
        assert_eq!(result.config_root.as_deref(), Some(test_dir.path()));
    }

    #[test]
    fn test_merge_scalar_override() {
        let test_dir = ConfigTree::new();

        // Higher precedence config (closer to CWD)
        let high = parsed(
            test_dir.path().join("project/.sift.toml"),
            r#"
[ranking]
limit = 20
[popularity]
exponent = 1.5
"#,
        );
        let low = parsed(
            test_dir.path().join(".sift.toml"),
            r#"
[ranking]
limit = 5
phrase_slop = 3
[popularity]
exponent = 3.0
weight = 2.0
"#,
        );

        let result = merge_configs(&[high, low]).unwrap();
        assert_eq!(result.ranking.limit, 20);
        assert_eq!(result.ranking.phrase_slop, 3);
        assert!((result.popularity.exponent - 1.5).abs() < f32::EPSILON);
        assert!((result.popularity.weight - 2.0).abs() < f32::EPSILON);
        assert_eq!(
            result.config_root.as_deref(),
            Some(test_dir.path().join("project").as_path())
        );
    }

    #[test]
    fn test_negative_boost_rejected() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nsummary_boost = -1.0\n",
        );
        let err = merge_configs(&[config]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ranking.summary_boost")
        );
    }

    #[test]
    fn test_nan_boost_rejected() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nname_exact_boost = nan\n",
        );
        assert!(merge_configs(&[config]).is_err());
    }

    #[test]
    fn test_fuzzy_distance_capped() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nfuzzy_distance = 3\n",
        );
        let err = merge_configs(&[config]).unwrap_err();
        assert!(err.to_string().contains("ranking.fuzzy_distance"));
    }

    #[test]
    fn test_margin_below_one_rejected() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nexact_precedence_margin = 0.5\n",
        );
        assert!(merge_configs(&[config]).is_err());
    }

    #[test]
    fn test_margin_of_one_rejected() {
        // A margin of exactly 1 lets an exact match tie a non-exact one.
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nexact_precedence_margin = 1.0\n",
        );
        let err = merge_configs(&[config]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ranking.exact_precedence_margin")
        );

        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[ranking]\nexact_precedence_margin = 1.5\n",
        );
        let result = merge_configs(&[config]).unwrap();
        assert!((result.ranking.exact_precedence_margin - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = parsed(PathBuf::from("/tmp/.sift.toml"), "[ranking]\nlimit = 0\n");
        assert!(merge_configs(&[config]).is_err());
    }

    #[test]
    fn test_zero_floor_rejected() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[popularity]\nfloor = 0.0\n",
        );
        let err = merge_configs(&[config]).unwrap_err();
        assert!(err.to_string().contains("popularity.floor"));
    }

    #[test]
    fn test_analyzer_bindings_merge_onto_defaults() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            r#"
[analyzers]
english = "en"
french = ["fr", "fr-CA"]
"#,
        );

        let result = merge_configs(&[config]).unwrap();
        assert_eq!(result.analyzers.bindings["en"], "english");
        assert_eq!(result.analyzers.bindings["fr-CA"], "french");
        assert_eq!(result.analyzers.bindings["de"], "german");
    }

    #[test]
    fn test_analyzer_binding_precedence() {
        let high = parsed(
            PathBuf::from("/tmp/project/.sift.toml"),
            "[analyzers]\nportuguese = \"gl\"\n",
        );
        let low = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[analyzers]\nspanish = \"gl\"\n",
        );

        let result = merge_configs(&[high, low]).unwrap();
        assert_eq!(result.analyzers.bindings["gl"], "portuguese");
    }

    #[test]
    fn test_unbind_locale() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[analyzers]\ndefault = [\"tr\"]\n",
        );

        let result = merge_configs(&[config]).unwrap();
        assert!(!result.analyzers.bindings.contains_key("tr"));
    }

    #[test]
    fn test_conflicting_binding_in_one_file() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            r#"
[analyzers]
english = "xx"
french = "xx"
"#,
        );

        let err = merge_configs(&[config]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingBinding { ref locale, ref first, ref second }
                if locale == "xx" && first == "english" && second == "french"
        ));
    }

    #[test]
    fn test_empty_locale_rejected() {
        let config = parsed(
            PathBuf::from("/tmp/.sift.toml"),
            "[analyzers]\nenglish = \" \"\n",
        );
        assert!(merge_configs(&[config]).is_err());
    }
}
