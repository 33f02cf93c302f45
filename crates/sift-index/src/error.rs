//! Error types for the sift-index crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when building or opening the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory, or `<memory>` for RAM indexes.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analyzer name bound to a locale is not a supported stemmer language.
    #[error("unsupported analyzer language: {0}")]
    InvalidLanguage(String),
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &tantivy::TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &tantivy::TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &tantivy::TantivyError) -> Self {
        Self::Commit(source.to_string())
    }
}

/// Errors raised while loading or validating a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Failed to read the corpus file.
    #[error("failed to read corpus {path}: {source}")]
    Read {
        /// Path to the corpus file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The corpus is not valid JSON or does not match the document shape.
    #[error("failed to parse corpus: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two documents share an identifier.
    #[error("duplicate document id {0}")]
    DuplicateId(u64),

    /// A document has no default locale.
    #[error("document {id} has an empty default locale")]
    EmptyDefaultLocale {
        /// Offending document.
        id: u64,
    },

    /// A document has no name in its default locale.
    #[error("document {id} has no name for its default locale {locale}")]
    MissingDefaultName {
        /// Offending document.
        id: u64,
        /// The document's default locale.
        locale: String,
    },
}

/// A failure inside the text-search capability.
#[derive(Debug, Clone, Error)]
#[error("search backend failed: {message}")]
pub struct BackendError {
    /// What went wrong.
    pub message: String,
}

impl BackendError {
    /// Creates a backend error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a backend error from a Tantivy error.
    pub(crate) fn tantivy(source: &tantivy::TantivyError) -> Self {
        Self::new(source.to_string())
    }
}

/// Errors returned by the ranking engine.
#[derive(Debug, Error)]
pub enum RankError {
    /// The search backend failed; distinct from a query with no results.
    #[error("search unavailable: {0}")]
    SearchUnavailable(#[from] BackendError),
}
