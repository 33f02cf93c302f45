//! The ranking engine: plan, search, combine, localize, order.

use std::sync::Arc;

use serde::Serialize;
use sift_config::Config;
use tracing::{debug, info, warn};

use crate::{
    AddonDocument, Corpus, IndexError, RankError,
    backend::{RawHit, SearchBackend},
    combine::ScoreCombiner,
    fingerprint::compute_fingerprint,
    fuzzy::TermExpansion,
    locale::LocaleResolver,
    planner::{QueryPlanner, normalize},
    request::{ClauseKind, StructuredRequest},
    result::{RankedResultSet, ScoredResult},
    search::TantivyBackend,
};

/// A query as typed by a user, with the locale the results are wanted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw query text.
    pub text: String,
    /// Requested locale, which need not exist in any document.
    pub locale: String,
}

impl SearchQuery {
    /// Creates a query.
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }
}

/// How a query would be evaluated.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// Planned request, `None` when the query matches nothing.
    pub request: Option<StructuredRequest>,
    /// Indexed terms reached by the fuzzy and prefix clauses.
    pub expansions: Vec<TermExpansion>,
    /// Ranking fingerprint of the parameters in use.
    pub fingerprint: String,
}

/// Ranks a corpus against queries.
///
/// Evaluation is read-only, so one engine can serve queries from many threads.
pub struct RankingEngine<B: SearchBackend = TantivyBackend> {
    /// Builds structured requests.
    planner: QueryPlanner,
    /// Applies popularity and exact precedence.
    combiner: ScoreCombiner,
    /// Picks display names.
    resolver: LocaleResolver,
    /// Documents the backend indexed.
    corpus: Arc<Corpus>,
    /// Text search.
    backend: B,
    /// Default result limit.
    limit: usize,
    /// Ranking fingerprint of the config.
    fingerprint: String,
}

#[allow(clippy::multiple_inherent_impl)]
impl RankingEngine {
    /// Indexes a corpus in memory and builds an engine over it.
    pub fn build(corpus: impl Into<Arc<Corpus>>, config: &Config) -> Result<Self, IndexError> {
        let corpus = corpus.into();
        let resolver = LocaleResolver::new(&config.analyzers)?;
        let backend = TantivyBackend::build(&corpus, config)?;
        info!(
            documents = corpus.len(),
            analyzers = resolver.analyzers().len(),
            "built search index"
        );
        Self::with_backend(corpus, config, backend)
    }
}

impl<B: SearchBackend> RankingEngine<B> {
    /// Builds an engine over an existing backend.
    ///
    /// The backend must have indexed the same corpus.
    pub fn with_backend(
        corpus: impl Into<Arc<Corpus>>,
        config: &Config,
        backend: B,
    ) -> Result<Self, IndexError> {
        let resolver = LocaleResolver::new(&config.analyzers)?;
        Ok(Self {
            planner: QueryPlanner::new(config.ranking.clone(), resolver.clone()),
            combiner: ScoreCombiner::from_config(config),
            resolver,
            corpus: corpus.into(),
            backend,
            limit: config.ranking.limit,
            fingerprint: compute_fingerprint(config),
        })
    }

    /// Ranks the corpus for a query, keeping the configured number of results.
    pub fn search(&self, query: &SearchQuery) -> Result<RankedResultSet, RankError> {
        self.search_with_limit(query, self.limit)
    }

    /// Ranks the corpus for a query, keeping at most `limit` results.
    ///
    /// A query without searchable terms matches nothing and never reaches the backend.
    pub fn search_with_limit(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<RankedResultSet, RankError> {
        let Some(request) = self.planner.plan(&query.text, &query.locale) else {
            debug!(locale = %query.locale, "query has no searchable terms");
            return Ok(RankedResultSet::empty(normalize(&query.text), &query.locale));
        };

        let hits = self
            .backend
            .execute(&request)
            .inspect_err(|e| warn!(error = %e, query = %request.query, "search backend failed"))?;
        let candidates = hits.len();

        let mut results = Vec::with_capacity(candidates);
        for hit in hits {
            let Some(document) = self.corpus.get(hit.id) else {
                warn!(id = hit.id, "index returned a document missing from the corpus");
                continue;
            };
            results.push(self.score(&request, document, hit));
        }

        self.combiner.apply_exact_precedence(&mut results);
        let ranked = RankedResultSet::new(request.query, request.locale, results, limit);

        debug!(
            query = %ranked.query,
            locale = %ranked.locale,
            analyzer = %request.analyzer,
            candidates,
            returned = ranked.len(),
            "ranked query"
        );
        Ok(ranked)
    }

    /// Plans a query and lists the index terms its fuzzy and prefix clauses reach.
    pub fn explain(&self, query: &SearchQuery) -> Result<Explanation, RankError> {
        let request = self.planner.plan(&query.text, &query.locale);
        let expansions = match &request {
            Some(request) => self.backend.expand_terms(request)?,
            None => Vec::new(),
        };
        Ok(Explanation {
            request,
            expansions,
            fingerprint: self.fingerprint.clone(),
        })
    }

    /// Ranking fingerprint of the parameters in use.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The ranked corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The search backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Combines one hit into a scored, localized result.
    fn score(
        &self,
        request: &StructuredRequest,
        document: &AddonDocument,
        hit: RawHit,
    ) -> ScoredResult {
        let combined = self
            .combiner
            .combine(&hit.clauses, document.popularity_signal());
        let display = self.resolver.resolve_display(document, &request.locale);

        ScoredResult {
            id: document.id,
            slug: document.slug.clone(),
            score: combined.score,
            name: display.text.to_string(),
            locale: display.locale.to_string(),
            exact_match: hit.matched(ClauseKind::NameExact),
            text_score: combined.text,
            popularity: combined.popularity,
            clauses: hit.clauses,
        }
    }
}
