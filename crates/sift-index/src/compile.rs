//! Query compiler.
//!
//! Compiles the clauses of a structured request into Tantivy queries. Name clauses have
//! constant scores per matched token, summary and description clauses keep BM25.
//! Analyzed clauses query both the locale's stemmed fields and the default fields, so a
//! locale without its own translation still matches through the default analyzer.
//!
//! The phrase clause compiles to the conjunction of its tokens; positions are checked by
//! the backend against the slop. Compound clauses depend on the term dictionary and are
//! compiled by the backend through [`QueryCompiler::compile_compound`].

use std::collections::BTreeMap;

use tantivy::{
    Term,
    query::{
        BooleanQuery, BoostQuery, ConstScoreQuery, DisjunctionMaxQuery, FuzzyTermQuery, Occur,
        Query, TermQuery,
    },
    schema::{Field, IndexRecordOption},
    tokenizer::TextAnalyzer,
};

use crate::{
    IndexError,
    analyzer::{AnalyzerId, tokenize},
    request::{Clause, ClauseSpec, FuzzyTerm, SearchField, StructuredRequest},
    schema::{IndexSchema, TextFields, exact_term},
};

/// The query tokens produced by one analyzer, with the fields that analyzer indexed.
struct Variant {
    /// Fields analyzed by the same pipeline as `tokens`.
    fields: TextFields,
    /// Query tokens.
    tokens: Vec<String>,
}

/// Compiles request clauses into Tantivy queries.
#[derive(Clone)]
pub struct QueryCompiler {
    /// Index schema for field references.
    schema: IndexSchema,
    /// Analyzers for the default pipeline and every localized field set.
    analyzers: BTreeMap<AnalyzerId, TextAnalyzer>,
}

impl QueryCompiler {
    /// Creates a compiler for a schema.
    pub fn new(schema: IndexSchema) -> Result<Self, IndexError> {
        let mut analyzers = BTreeMap::new();
        analyzers.insert(AnalyzerId::Default, AnalyzerId::Default.build()?);
        for analyzer in schema.analyzers() {
            analyzers.insert(analyzer.clone(), analyzer.build()?);
        }
        Ok(Self { schema, analyzers })
    }

    /// Compiles one clause of a request.
    ///
    /// Returns `None` when the clause cannot contribute: a zero boost, or no tokens
    /// survive analysis. Compound clauses always return `None` here.
    pub fn compile(&self, request: &StructuredRequest, clause: &Clause) -> Option<Box<dyn Query>> {
        if clause.boost() <= 0.0 {
            return None;
        }
        let boost = clause.boost();

        match clause.spec() {
            ClauseSpec::NameExact { locale } => Some(self.compile_exact(&request.query, locale, boost)),
            ClauseSpec::NamePhrase { .. } => self.compile_phrase(request, boost),
            ClauseSpec::NameMatch => self.compile_name_match(request, boost),
            ClauseSpec::NameFuzzy { terms } => self.compile_fuzzy(terms, boost),
            ClauseSpec::NamePrefix { prefix } => Some(self.compile_prefix(prefix, boost)),
            ClauseSpec::NameCompound { .. } => None,
            ClauseSpec::Summary => self.compile_relevance(request, SearchField::Summary, boost),
            ClauseSpec::Description => {
                self.compile_relevance(request, SearchField::Description, boost)
            }
        }
    }

    /// Exact name in the requested locale, or the default-locale name when the document
    /// has no translation for that locale.
    fn compile_exact(&self, normalized: &str, locale: &str, boost: f32) -> Box<dyn Query> {
        let in_locale = raw_term_query(self.schema.name_exact, &exact_term(locale, normalized));

        let default_name = raw_term_query(self.schema.name_exact_default, normalized);
        let untranslated = raw_term_query(self.schema.locales, locale);
        let fallback: Box<dyn Query> = Box::new(BooleanQuery::new(vec![
            (Occur::Must, default_name),
            (Occur::MustNot, untranslated),
        ]));

        let either = BooleanQuery::new(vec![(Occur::Should, in_locale), (Occur::Should, fallback)]);
        Box::new(ConstScoreQuery::new(Box::new(either), boost))
    }

    /// Name terms of the phrase clause, one list per analyzer variant with several tokens.
    pub fn phrase_terms(&self, request: &StructuredRequest) -> Vec<Vec<Term>> {
        self.variants(request)
            .into_iter()
            .filter(|variant| variant.tokens.len() > 1)
            .map(|variant| {
                variant
                    .tokens
                    .iter()
                    .map(|t| Term::from_field_text(variant.fields.name, t))
                    .collect()
            })
            .collect()
    }

    /// Names containing every phrase token, in some analyzer variant.
    fn compile_phrase(&self, request: &StructuredRequest, boost: f32) -> Option<Box<dyn Query>> {
        let conjunctions: Vec<Box<dyn Query>> = self
            .phrase_terms(request)
            .into_iter()
            .map(|terms| {
                let all = terms
                    .into_iter()
                    .map(|term| {
                        let query: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                        (Occur::Must, query)
                    })
                    .collect();
                Box::new(BooleanQuery::new(all)) as Box<dyn Query>
            })
            .collect();

        if conjunctions.is_empty() {
            return None;
        }
        Some(Box::new(ConstScoreQuery::new(any_of(conjunctions), boost)))
    }

    /// Parts of split compound terms: a constant score per part found in the name, plus
    /// BM25 of the part in the summary scaled by `summary_boost`.
    pub fn compile_compound(
        &self,
        parts: &[String],
        boost: f32,
        summary_boost: f32,
    ) -> Option<Box<dyn Query>> {
        if parts.is_empty() || boost <= 0.0 {
            return None;
        }
        let fields = self.schema.default;

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(parts.len() * 2);
        for part in parts {
            let in_name = raw_term_query(fields.name, part);
            clauses.push((Occur::Should, Box::new(ConstScoreQuery::new(in_name, boost))));
            if summary_boost > 0.0 {
                let in_summary = TermQuery::new(
                    Term::from_field_text(fields.summary, part),
                    IndexRecordOption::WithFreqs,
                );
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(in_summary), summary_boost)),
                ));
            }
        }
        Some(Box::new(BooleanQuery::new(clauses)))
    }

    /// One constant-score clause per query token found in the name.
    fn compile_name_match(&self, request: &StructuredRequest, boost: f32) -> Option<Box<dyn Query>> {
        let per_token = self
            .token_alternatives(request, SearchField::Name)
            .into_iter()
            .map(|alternatives| {
                let query: Box<dyn Query> = Box::new(ConstScoreQuery::new(any_of(alternatives), boost));
                (Occur::Should, query)
            })
            .collect::<Vec<_>>();

        if per_token.is_empty() {
            return None;
        }
        Some(Box::new(BooleanQuery::new(per_token)))
    }

    /// One constant-score clause per term matched within its edit distance.
    fn compile_fuzzy(&self, terms: &[FuzzyTerm], boost: f32) -> Option<Box<dyn Query>> {
        if terms.is_empty() {
            return None;
        }
        let clauses = terms
            .iter()
            .map(|term| {
                let fuzzy = FuzzyTermQuery::new(
                    Term::from_field_text(self.schema.default.name, &term.text),
                    term.distance,
                    true,
                );
                let query: Box<dyn Query> = Box::new(ConstScoreQuery::new(Box::new(fuzzy), boost));
                (Occur::Should, query)
            })
            .collect();
        Some(Box::new(BooleanQuery::new(clauses)))
    }

    /// Some name token starts with the prefix.
    fn compile_prefix(&self, prefix: &str, boost: f32) -> Box<dyn Query> {
        let query = FuzzyTermQuery::new_prefix(
            Term::from_field_text(self.schema.default.name, prefix),
            0,
            false,
        );
        Box::new(ConstScoreQuery::new(Box::new(query), boost))
    }

    /// BM25 per query token, best analyzer variant per token, scaled by the boost.
    fn compile_relevance(
        &self,
        request: &StructuredRequest,
        field: SearchField,
        boost: f32,
    ) -> Option<Box<dyn Query>> {
        let per_token = self
            .token_alternatives(request, field)
            .into_iter()
            .map(|alternatives| {
                let query: Box<dyn Query> = Box::new(DisjunctionMaxQuery::new(alternatives));
                (Occur::Should, query)
            })
            .collect::<Vec<_>>();

        if per_token.is_empty() {
            return None;
        }
        Some(Box::new(BoostQuery::new(
            Box::new(BooleanQuery::new(per_token)),
            boost,
        )))
    }

    /// For each query token position, a term query per analyzer variant.
    fn token_alternatives(
        &self,
        request: &StructuredRequest,
        field: SearchField,
    ) -> Vec<Vec<Box<dyn Query>>> {
        let variants = self.variants(request);
        let positions = variants.iter().map(|v| v.tokens.len()).max().unwrap_or(0);

        (0..positions)
            .map(|pos| {
                variants
                    .iter()
                    .filter_map(|variant| variant.tokens.get(pos).map(|t| (variant.fields, t)))
                    .map(|(fields, token)| {
                        let term = Term::from_field_text(fields.get(field), token);
                        Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>
                    })
                    .collect()
            })
            .collect()
    }

    /// Query tokens for the default fields and, when the locale has its own analyzer,
    /// for that analyzer's fields.
    fn variants(&self, request: &StructuredRequest) -> Vec<Variant> {
        let mut variants = Vec::with_capacity(2);
        if !request.analyzer.is_default()
            && let Some(fields) = self.schema.text_fields(&request.analyzer)
        {
            variants.push(Variant {
                fields: *fields,
                tokens: self.tokenize(&request.analyzer, &request.query),
            });
        }
        variants.push(Variant {
            fields: self.schema.default,
            tokens: self.tokenize(&AnalyzerId::Default, &request.query),
        });
        variants
    }

    /// Tokenizes text using the given analyzer, or the default one if unknown.
    fn tokenize(&self, analyzer: &AnalyzerId, text: &str) -> Vec<String> {
        let Some(analyzer) = self
            .analyzers
            .get(analyzer)
            .or_else(|| self.analyzers.get(&AnalyzerId::Default))
        else {
            return Vec::new();
        };
        tokenize(&mut analyzer.clone(), text)
    }
}

/// Exact term query on a raw string field.
fn raw_term_query(field: Field, text: &str) -> Box<dyn Query> {
    Box::new(TermQuery::new(
        Term::from_field_text(field, text),
        IndexRecordOption::Basic,
    ))
}

/// Matches when any of the queries matches.
fn any_of(mut queries: Vec<Box<dyn Query>>) -> Box<dyn Query> {
    if queries.len() == 1 {
        return queries.remove(0);
    }
    let clauses = queries.into_iter().map(|q| (Occur::Should, q)).collect();
    Box::new(BooleanQuery::new(clauses))
}
