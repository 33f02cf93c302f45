//! Structured search requests produced by the query planner.
//!
//! A request is backend-agnostic: it names the clauses to evaluate, their parameters and
//! boosts. The Tantivy backend compiles each clause into an index query.

use std::fmt;

use serde::Serialize;

use crate::analyzer::AnalyzerId;

/// Document fields a clause can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Add-on name.
    Name,
    /// Short summary.
    Summary,
    /// Long description.
    Description,
}

/// Identifies a clause for score breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    /// Whole name equals the query in the display locale.
    NameExact,
    /// Query tokens appear in the name as a phrase, within the slop.
    NamePhrase,
    /// Query tokens appear anywhere in the name.
    NameMatch,
    /// Query tokens appear in the name within an edit distance.
    NameFuzzy,
    /// Final query token prefixes a name token.
    NamePrefix,
    /// Parts of a compound query token appear in the name or summary.
    NameCompound,
    /// Query tokens appear in the summary.
    Summary,
    /// Query tokens appear in the description.
    Description,
}

impl ClauseKind {
    /// Field the clause targets.
    pub fn field(self) -> SearchField {
        match self {
            Self::NameExact
            | Self::NamePhrase
            | Self::NameMatch
            | Self::NameFuzzy
            | Self::NamePrefix
            | Self::NameCompound => SearchField::Name,
            Self::Summary => SearchField::Summary,
            Self::Description => SearchField::Description,
        }
    }

    /// Short label used in tables and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameExact => "name_exact",
            Self::NamePhrase => "name_phrase",
            Self::NameMatch => "name_match",
            Self::NameFuzzy => "name_fuzzy",
            Self::NamePrefix => "name_prefix",
            Self::NameCompound => "name_compound",
            Self::Summary => "summary",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query term with the edit distance it may be matched within.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyTerm {
    /// Analyzed term text.
    pub text: String,
    /// Maximum Levenshtein distance, transpositions counting as one edit.
    pub distance: u8,
}

/// What a clause matches and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClauseSpec {
    /// Normalized name equals the normalized query in the display locale.
    NameExact {
        /// Locale whose translation must match; falls back to the default locale
        /// when the document has no translation for it.
        locale: String,
    },
    /// Name contains the query tokens in order, allowing `slop` positional moves.
    NamePhrase {
        /// Word reordering tolerance.
        slop: u32,
    },
    /// Name contains query tokens; each matched token contributes the boost.
    NameMatch,
    /// Name contains terms within an edit distance; each matched term contributes.
    NameFuzzy {
        /// Terms with a non-zero edit distance.
        terms: Vec<FuzzyTerm>,
    },
    /// Some name token starts with `prefix`.
    NamePrefix {
        /// Final query term.
        prefix: String,
    },
    /// Query terms that may be compounds of indexed words, such as `downloadhelper`.
    ///
    /// The backend splits each term into two indexed words. Every part found in the name
    /// contributes the boost; parts found in the summary score like summary matches.
    NameCompound {
        /// Terms long enough to split.
        terms: Vec<String>,
        /// Minimum characters of each part.
        min_part: usize,
    },
    /// Summary contains query tokens, scored by relevance.
    Summary,
    /// Description contains query tokens, scored by relevance.
    Description,
}

impl ClauseSpec {
    /// Kind of this clause.
    pub fn kind(&self) -> ClauseKind {
        match self {
            Self::NameExact { .. } => ClauseKind::NameExact,
            Self::NamePhrase { .. } => ClauseKind::NamePhrase,
            Self::NameMatch => ClauseKind::NameMatch,
            Self::NameFuzzy { .. } => ClauseKind::NameFuzzy,
            Self::NamePrefix { .. } => ClauseKind::NamePrefix,
            Self::NameCompound { .. } => ClauseKind::NameCompound,
            Self::Summary => ClauseKind::Summary,
            Self::Description => ClauseKind::Description,
        }
    }
}

/// A clause and its multiplicative weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    /// What to match.
    #[serde(flatten)]
    spec: ClauseSpec,
    /// Weight applied to the clause score.
    boost: f32,
}

impl Clause {
    /// Creates a clause.
    ///
    /// # Panics
    ///
    /// Panics if `boost` is negative, NaN or infinite. Boosts come from validated
    /// configuration, so an invalid one is a programming error.
    pub fn new(spec: ClauseSpec, boost: f32) -> Self {
        assert!(
            boost.is_finite() && boost >= 0.0,
            "clause {} has invalid boost {boost}",
            spec.kind()
        );
        Self { spec, boost }
    }

    /// What the clause matches.
    pub fn spec(&self) -> &ClauseSpec {
        &self.spec
    }

    /// Kind of this clause.
    pub fn kind(&self) -> ClauseKind {
        self.spec.kind()
    }

    /// Weight applied to the clause score.
    pub fn boost(&self) -> f32 {
        self.boost
    }
}

/// A planned search: normalized query text, locale decisions and clauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredRequest {
    /// Query text, lowercased with whitespace collapsed.
    pub query: String,
    /// Locale the caller asked for.
    pub locale: String,
    /// Analyzer chosen for the locale.
    pub analyzer: AnalyzerId,
    /// Query terms produced by the default analyzer.
    pub terms: Vec<String>,
    /// Clauses to evaluate; scores are summed.
    pub clauses: Vec<Clause>,
}

impl StructuredRequest {
    /// Returns the clause of a given kind, if planned.
    pub fn clause(&self, kind: ClauseKind) -> Option<&Clause> {
        self.clauses.iter().find(|clause| clause.kind() == kind)
    }
}
