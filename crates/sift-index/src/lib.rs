//! Multilingual add-on ranking for sift.
//!
//! This crate ranks a corpus of add-ons (extensions and themes with translated names,
//! summaries and descriptions) against free-text queries in a requested locale.
//! It handles:
//! - Corpus validation and JSON loading
//! - Locale resolution: which translation to display, which analyzer to query with
//! - Query planning: exact, phrase, per-token, fuzzy, prefix, compound, summary and
//!   description clauses with configured boosts
//! - A Tantivy index with default and per-language stemmed fields
//! - Candidate selection weighted by popularity, then complete per-clause scoring
//! - Score combination with a popularity curve and exact-match precedence
//!
//! # Example
//!
//! ```no_run
//! use sift_config::Config;
//! use sift_index::{AddonDocument, Corpus, RankingEngine, SearchQuery};
//!
//! let corpus = Corpus::new(vec![
//!     AddonDocument::new(1, "tab-center-redux", "en-US", "Tab Center Redux")
//!         .with_popularity(22_000, 0),
//! ])
//! .unwrap();
//!
//! let engine = RankingEngine::build(corpus, &Config::default()).unwrap();
//! let results = engine
//!     .search(&SearchQuery::new("tab center redux", "en-US"))
//!     .unwrap();
//! assert_eq!(results.names(), vec!["Tab Center Redux"]);
//! ```

#![warn(missing_docs)]

mod analyzer;
mod backend;
mod combine;
mod compile;
mod compound;
mod corpus;
mod document;
mod engine;
mod error;
mod fingerprint;
mod fuzzy;
mod locale;
mod phrase;
mod planner;
mod request;
mod result;
mod schema;
mod search;
mod writer;

pub use analyzer::{AnalyzerId, DEFAULT_ANALYZER};
pub use backend::{RawHit, SearchBackend};
pub use combine::{Combined, ScoreCombiner};
pub use compile::QueryCompiler;
pub use corpus::Corpus;
pub use document::{AddonDocument, AddonType, Translations};
pub use engine::{Explanation, RankingEngine, SearchQuery};
pub use error::{BackendError, CorpusError, IndexError, RankError};
pub use fingerprint::{SCORING_VERSION, ScoringParameters, compute_fingerprint};
pub use fuzzy::TermExpansion;
pub use locale::{LocaleResolver, LocalizedText};
pub use planner::{QueryPlanner, fuzzy_distance_for, normalize};
pub use request::{Clause, ClauseKind, ClauseSpec, FuzzyTerm, SearchField, StructuredRequest};
pub use result::{ClauseScore, RankedResultSet, ScoredResult};
pub use schema::{IndexSchema, TextFields};
pub use search::TantivyBackend;
pub use writer::IndexWriter;
