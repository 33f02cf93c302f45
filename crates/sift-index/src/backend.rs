//! The text-search capability the ranking engine runs planned requests against.

use crate::{
    BackendError,
    fuzzy::TermExpansion,
    request::{ClauseKind, StructuredRequest},
    result::ClauseScore,
};

/// A document matched by the backend, with the boosted score of each matching clause.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Document identifier.
    pub id: u64,
    /// Scores of the clauses that matched, in request order.
    pub clauses: Vec<ClauseScore>,
}

impl RawHit {
    /// Sum of clause scores.
    pub fn text_score(&self) -> f32 {
        self.clauses.iter().map(|clause| clause.score).sum()
    }

    /// Whether a clause of the given kind matched.
    pub fn matched(&self, kind: ClauseKind) -> bool {
        self.clauses.iter().any(|clause| clause.kind == kind)
    }
}

/// Executes structured requests.
///
/// Implementations return every candidate with a positive score for at least one clause.
/// Popularity, exact-match precedence and final ordering are applied by the caller.
pub trait SearchBackend: Send + Sync {
    /// Runs every clause of a request.
    fn execute(&self, request: &StructuredRequest) -> Result<Vec<RawHit>, BackendError>;

    /// Indexed terms that the fuzzy and prefix clauses of a request reach.
    fn expand_terms(&self, _request: &StructuredRequest) -> Result<Vec<TermExpansion>, BackendError> {
        Ok(Vec::new())
    }
}
