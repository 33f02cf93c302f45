//! Tantivy implementation of the search backend.
//!
//! A request is evaluated in two passes. Candidate selection runs every clause as one
//! disjunction and keeps the `candidate_limit` best documents by text score times
//! popularity factor, read from the `popularity` fast field, plus every exact match.
//! Each clause is then scored on every candidate, so a candidate's breakdown is complete
//! no matter how many other documents a clause matched.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use sift_config::Config;
use tantivy::{
    DocAddress, DocId, DocSet, Index, IndexReader, ReloadPolicy, Score, Searcher, SegmentReader,
    TantivyError, Term,
    collector::{DocSetCollector, TopDocs},
    directory::MmapDirectory,
    postings::{Postings, SegmentPostings},
    query::{BooleanQuery, EnableScoring, Occur, Query},
    schema::IndexRecordOption,
};
use tracing::{debug, warn};

use crate::{
    BackendError, Corpus, IndexError,
    analyzer::register_analyzers,
    backend::{RawHit, SearchBackend},
    combine::ScoreCombiner,
    compile::QueryCompiler,
    compound::split_compound,
    fuzzy::{TermExpansion, expand_term},
    locale::LocaleResolver,
    phrase::within_slop,
    request::{Clause, ClauseKind, ClauseSpec, StructuredRequest},
    result::ClauseScore,
    schema::{ID_FIELD, IndexSchema, POPULARITY_FIELD},
    writer::IndexWriter,
};

/// A clause compiled against the current index.
struct CompiledClause {
    /// Clause the scores are reported under.
    kind: ClauseKind,
    /// Query producing the clause score.
    query: Box<dyn Query>,
    /// Position check applied on top of the query, for phrase clauses.
    phrase: Option<PhraseCheck>,
}

/// Phrase terms whose positions must fall within the slop.
struct PhraseCheck {
    /// One term list per analyzer variant; any variant may match.
    variants: Vec<Vec<Term>>,
    /// Word reordering tolerance.
    slop: u32,
}

/// Postings of the phrase terms in one segment.
struct PhrasePostings {
    /// Per variant, postings of every term; variants with a missing term are dropped.
    variants: Vec<Vec<SegmentPostings>>,
    /// Word reordering tolerance.
    slop: u32,
}

impl PhrasePostings {
    /// Opens the postings of every phrase term in a segment.
    fn open(segment_reader: &SegmentReader, check: &PhraseCheck) -> Result<Self, BackendError> {
        let mut variants = Vec::with_capacity(check.variants.len());
        for terms in &check.variants {
            if let Some(postings) = open_postings(segment_reader, terms)? {
                variants.push(postings);
            }
        }
        Ok(Self {
            variants,
            slop: check.slop,
        })
    }

    /// Whether the phrase occurs in `doc` within the slop.
    ///
    /// Documents must be visited in increasing order.
    fn matches(&mut self, doc: DocId) -> bool {
        let slop = self.slop;
        self.variants.iter_mut().any(|postings| {
            let mut positions = Vec::with_capacity(postings.len());
            for posting in postings.iter_mut() {
                if posting.doc() < doc {
                    posting.seek(doc);
                }
                if posting.doc() != doc {
                    return false;
                }
                let mut term_positions = Vec::new();
                posting.positions(&mut term_positions);
                positions.push(term_positions);
            }
            within_slop(&positions, slop)
        })
    }
}

/// Postings with positions for every term, or `None` if some term is absent.
fn open_postings(
    segment_reader: &SegmentReader,
    terms: &[Term],
) -> Result<Option<Vec<SegmentPostings>>, BackendError> {
    let mut postings = Vec::with_capacity(terms.len());
    for term in terms {
        let inverted_index = segment_reader
            .inverted_index(term.field())
            .map_err(|e| BackendError::new(e.to_string()))?;
        let Some(term_postings) = inverted_index
            .read_postings(term, IndexRecordOption::WithFreqsAndPositions)
            .map_err(|e| BackendError::new(e.to_string()))?
        else {
            return Ok(None);
        };
        postings.push(term_postings);
    }
    Ok(Some(postings))
}

/// Search backend over a Tantivy index of a corpus.
pub struct TantivyBackend {
    /// Reader over the committed index.
    reader: IndexReader,
    /// Field handles.
    schema: IndexSchema,
    /// Turns clauses into Tantivy queries.
    compiler: QueryCompiler,
    /// Popularity curve used while selecting candidates.
    combiner: ScoreCombiner,
    /// Candidates kept by text score times popularity, exact matches aside.
    candidate_limit: usize,
}

impl TantivyBackend {
    /// Indexes a corpus in memory.
    pub fn build(corpus: &Corpus, config: &Config) -> Result<Self, IndexError> {
        let resolver = LocaleResolver::new(&config.analyzers)?;
        let mut writer = IndexWriter::in_ram(&resolver)?;
        writer.add_corpus(corpus)?;
        writer.commit()?;
        let (index, schema) = writer.finish()?;
        Self::from_index(&index, schema, config)
    }

    /// Indexes a corpus into a directory, replacing whatever the index held.
    pub fn build_at(path: &Path, corpus: &Corpus, config: &Config) -> Result<Self, IndexError> {
        let resolver = LocaleResolver::new(&config.analyzers)?;
        let mut writer = IndexWriter::open(path, &resolver)?;
        writer.delete_all()?;
        writer.add_corpus(corpus)?;
        writer.commit()?;
        let (index, schema) = writer.finish()?;
        Self::from_index(&index, schema, config)
    }

    /// Opens an index previously written with [`build_at`](Self::build_at).
    ///
    /// The config must carry the analyzer bindings the index was built with.
    pub fn open(path: &Path, config: &Config) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::OpenIndex {
                path: path.to_path_buf(),
                message: "index directory does not exist".to_string(),
            });
        }

        let resolver = LocaleResolver::new(&config.analyzers)?;
        let schema = IndexSchema::new(&resolver.analyzers());

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;
        let index = Index::open(dir).map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        let stored = index.schema();
        let compatible = schema
            .schema()
            .fields()
            .all(|(field, entry)| stored.get_field(entry.name()).ok() == Some(field));
        if !compatible {
            return Err(IndexError::OpenIndex {
                path: path.to_path_buf(),
                message: "index was built with different analyzer bindings".to_string(),
            });
        }

        register_analyzers(&index, schema.analyzers())?;
        Self::from_index(&index, schema, config)
    }

    /// Creates the reader and query compiler for a built index.
    fn from_index(index: &Index, schema: IndexSchema, config: &Config) -> Result<Self, IndexError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index("<memory>".into(), &e))?;
        let compiler = QueryCompiler::new(schema.clone())?;

        Ok(Self {
            reader,
            schema,
            compiler,
            combiner: ScoreCombiner::from_config(config),
            candidate_limit: config.ranking.candidate_limit.max(1),
        })
    }

    /// Number of indexed documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Field handles of the index.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Compiles every clause that can contribute.
    fn compile_clauses(
        &self,
        searcher: &Searcher,
        request: &StructuredRequest,
    ) -> Vec<CompiledClause> {
        let mut compiled = Vec::with_capacity(request.clauses.len());
        for clause in &request.clauses {
            let (query, phrase) = match clause.spec() {
                ClauseSpec::NameCompound { terms, min_part } => {
                    let parts = self.compound_parts(searcher, terms, *min_part);
                    let summary_boost = request
                        .clause(ClauseKind::Summary)
                        .map_or(0.0, Clause::boost);
                    let query = self
                        .compiler
                        .compile_compound(&parts, clause.boost(), summary_boost);
                    (query, None)
                }
                ClauseSpec::NamePhrase { slop } => {
                    let check = PhraseCheck {
                        variants: self.compiler.phrase_terms(request),
                        slop: *slop,
                    };
                    (self.compiler.compile(request, clause), Some(check))
                }
                _ => (self.compiler.compile(request, clause), None),
            };
            if let Some(query) = query {
                compiled.push(CompiledClause {
                    kind: clause.kind(),
                    query,
                    phrase,
                });
            }
        }
        compiled
    }

    /// Splits compound terms into pairs of words the name or summary dictionary holds.
    fn compound_parts(
        &self,
        searcher: &Searcher,
        terms: &[String],
        min_part: usize,
    ) -> Vec<String> {
        let fields = [self.schema.default.name, self.schema.default.summary];
        let is_word = |word: &str| {
            fields.iter().any(|&field| {
                searcher
                    .doc_freq(&Term::from_field_text(field, word))
                    .inspect_err(|e| warn!(error = %e, word, "term lookup failed"))
                    .is_ok_and(|count| count > 0)
            })
        };

        let mut parts = Vec::new();
        for term in terms {
            if let Some((head, tail)) = split_compound(term, min_part, &is_word) {
                debug!(term = %term, head, tail, "split compound term");
                parts.push(head.to_string());
                parts.push(tail.to_string());
            }
        }
        parts
    }

    /// Keeps the best documents by text score times popularity, and every exact match.
    fn select_candidates(
        &self,
        searcher: &Searcher,
        clauses: &[CompiledClause],
    ) -> Result<BTreeSet<DocAddress>, BackendError> {
        let any_clause = BooleanQuery::new(
            clauses
                .iter()
                .map(|clause| (Occur::Should, clause.query.box_clone()))
                .collect(),
        );

        let combiner = self.combiner.clone();
        let collector = TopDocs::with_limit(self.candidate_limit).tweak_score(
            move |segment_reader: &SegmentReader| {
                let popularity = segment_reader.fast_fields().u64(POPULARITY_FIELD).ok();
                let ids = segment_reader.fast_fields().u64(ID_FIELD).ok();
                let combiner = combiner.clone();
                move |doc: DocId, score: Score| {
                    let signal = popularity.as_ref().and_then(|c| c.first(doc)).unwrap_or(0);
                    let id = ids.as_ref().and_then(|c| c.first(doc)).unwrap_or(u64::MAX);
                    // Equal scores keep the lower id, matching the final order.
                    (score * combiner.popularity_factor(signal), Reverse(id))
                }
            },
        );

        let top_docs = searcher
            .search(&any_clause, &collector)
            .map_err(|e| BackendError::tantivy(&e))?;
        let mut candidates: BTreeSet<DocAddress> =
            top_docs.into_iter().map(|(_, address)| address).collect();

        for clause in clauses.iter().filter(|c| c.kind == ClauseKind::NameExact) {
            let exact = searcher
                .search(&*clause.query, &DocSetCollector)
                .map_err(|e| BackendError::tantivy(&e))?;
            candidates.extend(exact);
        }
        Ok(candidates)
    }

    /// Scores every clause on every candidate.
    fn score_candidates(
        &self,
        searcher: &Searcher,
        clauses: &[CompiledClause],
        candidates: &BTreeSet<DocAddress>,
    ) -> Result<Vec<RawHit>, BackendError> {
        let mut by_segment: BTreeMap<u32, Vec<DocId>> = BTreeMap::new();
        for address in candidates {
            by_segment
                .entry(address.segment_ord)
                .or_default()
                .push(address.doc_id);
        }

        let weights = clauses
            .iter()
            .map(|clause| {
                clause
                    .query
                    .weight(EnableScoring::enabled_from_searcher(searcher))
                    .map_err(|e| BackendError::tantivy(&e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut hits = Vec::with_capacity(candidates.len());
        for (segment_ord, docs) in by_segment {
            let segment_reader = searcher.segment_reader(segment_ord);
            let mut scores: Vec<Vec<ClauseScore>> = vec![Vec::new(); docs.len()];

            for (clause, weight) in clauses.iter().zip(&weights) {
                let mut scorer = weight
                    .scorer(segment_reader, 1.0)
                    .map_err(|e| BackendError::tantivy(&e))?;
                let mut phrase = clause
                    .phrase
                    .as_ref()
                    .map(|check| PhrasePostings::open(segment_reader, check))
                    .transpose()?;

                for (slot, &doc) in docs.iter().enumerate() {
                    if scorer.doc() < doc {
                        scorer.seek(doc);
                    }
                    if scorer.doc() != doc {
                        continue;
                    }
                    let score = scorer.score();
                    let in_phrase = phrase.as_mut().is_none_or(|p| p.matches(doc));
                    if score > 0.0 && in_phrase {
                        scores[slot].push(ClauseScore {
                            kind: clause.kind,
                            score,
                        });
                    }
                }
            }

            let ids = segment_reader
                .fast_fields()
                .u64(ID_FIELD)
                .map_err(|e| BackendError::tantivy(&e))?;
            for (doc, clause_scores) in docs.into_iter().zip(scores) {
                if clause_scores.is_empty() {
                    continue;
                }
                if let Some(id) = ids.first(doc) {
                    hits.push(RawHit {
                        id,
                        clauses: clause_scores,
                    });
                }
            }
        }

        hits.sort_by_key(|hit| hit.id);
        Ok(hits)
    }
}

impl SearchBackend for TantivyBackend {
    fn execute(&self, request: &StructuredRequest) -> Result<Vec<RawHit>, BackendError> {
        let searcher = self.reader.searcher();
        let clauses = self.compile_clauses(&searcher, request);
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.select_candidates(&searcher, &clauses)?;
        self.score_candidates(&searcher, &clauses, &candidates)
    }

    fn expand_terms(&self, request: &StructuredRequest) -> Result<Vec<TermExpansion>, BackendError> {
        let searcher = self.reader.searcher();
        let field = self.schema.default.name;
        let mut expansions = Vec::new();

        for clause in &request.clauses {
            match clause.spec() {
                ClauseSpec::NameFuzzy { terms } => {
                    for term in terms {
                        expansions.push(expand_term(
                            &searcher,
                            field,
                            &term.text,
                            term.distance,
                            false,
                        )?);
                    }
                }
                ClauseSpec::NamePrefix { prefix } => {
                    expansions.push(expand_term(&searcher, field, prefix, 0, true)?);
                }
                _ => {}
            }
        }
        Ok(expansions)
    }
}
