//! Scored results and ranked result sets.

use std::{cmp::Ordering, slice, vec};

use serde::Serialize;

use crate::request::ClauseKind;

/// Score one clause contributed to a document, boost applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClauseScore {
    /// Clause that matched.
    pub kind: ClauseKind,
    /// Boosted clause score.
    pub score: f32,
}

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    /// Document identifier.
    pub id: u64,
    /// Document slug.
    pub slug: String,
    /// Final score: text score times popularity, lifted for exact matches.
    pub score: f32,
    /// Name shown for the requested locale.
    pub name: String,
    /// Locale the shown name is written in.
    pub locale: String,
    /// Whether the exact-name clause matched.
    pub exact_match: bool,
    /// Sum of clause scores.
    pub text_score: f32,
    /// Popularity multiplier.
    pub popularity: f32,
    /// Per-clause breakdown of `text_score`.
    pub clauses: Vec<ClauseScore>,
}

impl ScoredResult {
    /// Whether a clause of the given kind contributed.
    pub fn matched(&self, kind: ClauseKind) -> bool {
        self.clauses.iter().any(|clause| clause.kind == kind)
    }
}

/// Orders results by descending score, then ascending id.
fn rank_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Results for one query, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResultSet {
    /// Normalized query text.
    pub query: String,
    /// Requested locale.
    pub locale: String,
    /// Ranked results.
    results: Vec<ScoredResult>,
}

impl RankedResultSet {
    /// Sorts results into rank order and keeps the first `limit`.
    pub fn new(
        query: impl Into<String>,
        locale: impl Into<String>,
        mut results: Vec<ScoredResult>,
        limit: usize,
    ) -> Self {
        results.sort_by(rank_order);
        results.truncate(limit);
        Self {
            query: query.into(),
            locale: locale.into(),
            results,
        }
    }

    /// A result set for a query that matches nothing.
    pub fn empty(query: impl Into<String>, locale: impl Into<String>) -> Self {
        Self::new(query, locale, Vec::new(), 0)
    }

    /// Ranked results, best first.
    pub fn results(&self) -> &[ScoredResult] {
        &self.results
    }

    /// Iterates results, best first.
    pub fn iter(&self) -> slice::Iter<'_, ScoredResult> {
        self.results.iter()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Displayed names in rank order.
    pub fn names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.name.as_str()).collect()
    }

    /// Position of the result with the given displayed name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.results.iter().position(|r| r.name == name)
    }
}

impl IntoIterator for RankedResultSet {
    type Item = ScoredResult;
    type IntoIter = vec::IntoIter<ScoredResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a ScoredResult;
    type IntoIter = slice::Iter<'a, ScoredResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
