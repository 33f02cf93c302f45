//! Query planning: turns raw query text and a locale into a structured request.

use sift_config::RankingSettings;
use tantivy::tokenizer::TextAnalyzer;

use crate::{
    analyzer::{build_default_analyzer, tokenize},
    locale::LocaleResolver,
    request::{Clause, ClauseSpec, FuzzyTerm, StructuredRequest},
};

/// Tokens up to this many characters are never matched fuzzily.
const EXACT_ONLY_MAX_CHARS: usize = 2;

/// Tokens up to this many characters allow one edit; longer tokens allow two.
const ONE_EDIT_MAX_CHARS: usize = 5;

/// Shortest part a compound token may be split into.
const MIN_COMPOUND_PART_CHARS: usize = 3;

/// Lowercases text and collapses runs of whitespace into single spaces.
///
/// Both queries and indexed names go through this before exact comparison.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Edit distance allowed for a token, before applying the configured cap.
pub fn fuzzy_distance_for(token: &str) -> u8 {
    match token.chars().count() {
        0..=EXACT_ONLY_MAX_CHARS => 0,
        n if n <= ONE_EDIT_MAX_CHARS => 1,
        _ => 2,
    }
}

/// Builds structured requests from ranking settings.
#[derive(Clone)]
pub struct QueryPlanner {
    /// Boosts and clause parameters.
    settings: RankingSettings,
    /// Locale to analyzer bindings.
    resolver: LocaleResolver,
    /// Language-agnostic analyzer used for fuzzy and prefix terms.
    analyzer: TextAnalyzer,
}

impl QueryPlanner {
    /// Creates a planner.
    pub fn new(settings: RankingSettings, resolver: LocaleResolver) -> Self {
        Self {
            settings,
            resolver,
            analyzer: build_default_analyzer(),
        }
    }

    /// Plans a query in a requested locale.
    ///
    /// Returns `None` when the query has no searchable content, which matches nothing.
    pub fn plan(&self, query: &str, requested_locale: &str) -> Option<StructuredRequest> {
        let normalized = normalize(query);
        let mut analyzer = self.analyzer.clone();
        let terms = tokenize(&mut analyzer, &normalized);
        if terms.is_empty() {
            return None;
        }

        let settings = &self.settings;
        let mut clauses = vec![Clause::new(
            ClauseSpec::NameExact {
                locale: requested_locale.to_string(),
            },
            settings.name_exact_boost,
        )];

        if terms.len() > 1 {
            clauses.push(Clause::new(
                ClauseSpec::NamePhrase {
                    slop: settings.phrase_slop,
                },
                settings.name_phrase_boost,
            ));
        }

        clauses.push(Clause::new(ClauseSpec::NameMatch, settings.name_match_boost));

        let fuzzy_terms: Vec<FuzzyTerm> = terms
            .iter()
            .map(|term| FuzzyTerm {
                text: term.clone(),
                distance: fuzzy_distance_for(term).min(settings.fuzzy_distance),
            })
            .filter(|term| term.distance > 0)
            .collect();
        if !fuzzy_terms.is_empty() {
            clauses.push(Clause::new(
                ClauseSpec::NameFuzzy { terms: fuzzy_terms },
                settings.name_fuzzy_boost,
            ));
        }

        if let Some(last) = terms.last()
            && last.chars().count() >= settings.prefix_min_length
        {
            clauses.push(Clause::new(
                ClauseSpec::NamePrefix {
                    prefix: last.clone(),
                },
                settings.name_prefix_boost,
            ));
        }

        let compounds: Vec<String> = terms
            .iter()
            .filter(|term| term.chars().count() >= 2 * MIN_COMPOUND_PART_CHARS)
            .cloned()
            .collect();
        if !compounds.is_empty() {
            clauses.push(Clause::new(
                ClauseSpec::NameCompound {
                    terms: compounds,
                    min_part: MIN_COMPOUND_PART_CHARS,
                },
                settings.name_compound_boost,
            ));
        }

        clauses.push(Clause::new(ClauseSpec::Summary, settings.summary_boost));
        clauses.push(Clause::new(
            ClauseSpec::Description,
            settings.description_boost,
        ));

        Some(StructuredRequest {
            query: normalized,
            locale: requested_locale.to_string(),
            analyzer: self.resolver.resolve_analyzer(requested_locale),
            terms,
            clauses,
        })
    }

    /// Ranking settings this planner was built with.
    pub fn settings(&self) -> &RankingSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use sift_config::AnalyzerSettings;

    use super::*;
    use crate::{analyzer::AnalyzerId, request::ClauseKind};

    fn planner() -> QueryPlanner {
        planner_with(RankingSettings::default())
    }

    fn planner_with(settings: RankingSettings) -> QueryPlanner {
        let resolver = LocaleResolver::new(&AnalyzerSettings::default()).unwrap();
        QueryPlanner::new(settings, resolver)
    }

    fn kinds(request: &StructuredRequest) -> Vec<ClauseKind> {
        request.clauses.iter().map(Clause::kind).collect()
    }

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  No   Flash\t"), "no flash");
        assert_eq!(normalize("ÉCRAN"), "écran");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn fuzzy_distance_by_length() {
        assert_eq!(fuzzy_distance_for("no"), 0);
        assert_eq!(fuzzy_distance_for("tab"), 1);
        assert_eq!(fuzzy_distance_for("flash"), 1);
        assert_eq!(fuzzy_distance_for("wizzard"), 2);
        assert_eq!(fuzzy_distance_for("été"), 1);
    }

    #[test]
    fn empty_query_plans_nothing() {
        assert!(planner().plan("", "en-US").is_none());
        assert!(planner().plan("   \t", "en-US").is_none());
        assert!(planner().plan("&& !!", "en-US").is_none());
    }

    #[test]
    fn multi_token_query_plans_all_clauses() {
        let request = planner().plan("Tab Center Redux", "en-US").unwrap();

        assert_eq!(request.query, "tab center redux");
        assert_eq!(request.terms, vec!["tab", "center", "redux"]);
        assert_eq!(request.analyzer, AnalyzerId::Language("english".into()));
        assert_eq!(
            kinds(&request),
            vec![
                ClauseKind::NameExact,
                ClauseKind::NamePhrase,
                ClauseKind::NameMatch,
                ClauseKind::NameFuzzy,
                ClauseKind::NamePrefix,
                ClauseKind::NameCompound,
                ClauseKind::Summary,
                ClauseKind::Description,
            ]
        );
    }

    #[test]
    fn only_long_tokens_are_compound_candidates() {
        let request = planner().plan("DownloadHelper tab", "en-US").unwrap();
        assert_eq!(
            request.clause(ClauseKind::NameCompound).map(Clause::spec),
            Some(&ClauseSpec::NameCompound {
                terms: vec!["downloadhelper".into()],
                min_part: 3,
            })
        );

        let request = planner().plan("no flash", "en-US").unwrap();
        assert!(request.clause(ClauseKind::NameCompound).is_none());
    }

    #[test]
    fn single_token_has_no_phrase() {
        let request = planner().plan("Privacy", "en-US").unwrap();
        assert!(request.clause(ClauseKind::NamePhrase).is_none());
        assert!(request.clause(ClauseKind::NameMatch).is_some());
    }

    #[test]
    fn short_tokens_are_not_fuzzy() {
        let request = planner().plan("no flash", "en-US").unwrap();
        let Some(ClauseSpec::NameFuzzy { terms }) =
            request.clause(ClauseKind::NameFuzzy).map(Clause::spec)
        else {
            panic!("expected fuzzy clause");
        };
        assert_eq!(
            terms,
            &vec![FuzzyTerm {
                text: "flash".into(),
                distance: 1
            }]
        );

        let request = planner().plan("no", "en-US").unwrap();
        assert!(request.clause(ClauseKind::NameFuzzy).is_none());
    }

    #[test]
    fn fuzzy_distance_capped_by_settings() {
        let planner = planner_with(RankingSettings {
            fuzzy_distance: 1,
            ..Default::default()
        });
        let request = planner.plan("wizzard", "en-US").unwrap();
        let Some(ClauseSpec::NameFuzzy { terms }) =
            request.clause(ClauseKind::NameFuzzy).map(Clause::spec)
        else {
            panic!("expected fuzzy clause");
        };
        assert_eq!(terms[0].distance, 1);

        let planner = planner_with(RankingSettings {
            fuzzy_distance: 0,
            ..Default::default()
        });
        let request = planner.plan("wizzard", "en-US").unwrap();
        assert!(request.clause(ClauseKind::NameFuzzy).is_none());
    }

    #[test]
    fn prefix_needs_minimum_length() {
        let request = planner().plan("firefox ad", "en-US").unwrap();
        assert!(request.clause(ClauseKind::NamePrefix).is_none());

        let request = planner().plan("fireb", "en-US").unwrap();
        assert_eq!(
            request.clause(ClauseKind::NamePrefix).map(Clause::spec),
            Some(&ClauseSpec::NamePrefix {
                prefix: "fireb".into()
            })
        );
    }

    #[test]
    fn plan_is_case_insensitive() {
        let planner = planner();
        assert_eq!(
            planner.plan("No Flash", "en-US"),
            planner.plan("no flash", "en-US")
        );
        assert_eq!(
            planner.plan("MERGE  All WINDOWS", "fr"),
            planner.plan("merge all windows", "fr")
        );
    }

    #[test]
    fn exact_clause_targets_requested_locale() {
        let request = planner().plan("foobar unique francais", "mn").unwrap();
        assert_eq!(request.analyzer, AnalyzerId::Default);
        assert_eq!(
            request.clause(ClauseKind::NameExact).map(Clause::spec),
            Some(&ClauseSpec::NameExact {
                locale: "mn".into()
            })
        );
    }

    #[test]
    fn boosts_come_from_settings() {
        let planner = planner_with(RankingSettings {
            name_match_boost: 2.5,
            phrase_slop: 3,
            ..Default::default()
        });
        let request = planner.plan("merge windows", "en-US").unwrap();

        let matched = request.clause(ClauseKind::NameMatch).unwrap();
        assert!((matched.boost() - 2.5).abs() < f32::EPSILON);
        assert_eq!(
            request.clause(ClauseKind::NamePhrase).map(Clause::spec),
            Some(&ClauseSpec::NamePhrase { slop: 3 })
        );
    }
}
