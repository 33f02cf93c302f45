//! Text analysis pipelines for the sift search index.
//!
//! Every locale is analyzed by one of two kinds of pipeline:
//! 1. The default pipeline: `SimpleTokenizer`, `LowerCaser`, `RemoveLongFilter` and
//!    `AsciiFoldingFilter`. It is language-agnostic and never stems.
//! 2. A stemming pipeline: `SimpleTokenizer`, `LowerCaser`, `RemoveLongFilter` and a
//!    language `Stemmer`, used for locales bound to that language.

use std::fmt;

use serde::{Serialize, Serializer};
use tantivy::{
    Index,
    tokenizer::{
        AsciiFoldingFilter, Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer,
        TextAnalyzer, TokenStream,
    },
};

use crate::IndexError;

/// Name of the default analyzer, also used as a tokenizer name suffix.
pub const DEFAULT_ANALYZER: &str = "default";

/// Prefix of every tokenizer registered with Tantivy.
const TOKENIZER_PREFIX: &str = "sift_";

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Identifies the analysis pipeline used for a locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalyzerId {
    /// Language-agnostic pipeline without stemming.
    Default,
    /// Stemming pipeline for a language, stored by its lowercase name (e.g. `english`).
    Language(String),
}

impl AnalyzerId {
    /// Parses an analyzer name, validating stemmer languages.
    pub fn parse(name: &str) -> Result<Self, IndexError> {
        let name = name.to_lowercase();
        if name == DEFAULT_ANALYZER {
            return Ok(Self::Default);
        }
        parse_language(&name)?;
        Ok(Self::Language(name))
    }

    /// Returns the analyzer name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => DEFAULT_ANALYZER,
            Self::Language(name) => name,
        }
    }

    /// Returns the name this analyzer is registered under in Tantivy.
    pub fn tokenizer_name(&self) -> String {
        format!("{TOKENIZER_PREFIX}{}", self.as_str())
    }

    /// Builds the text analyzer for this pipeline.
    pub fn build(&self) -> Result<TextAnalyzer, IndexError> {
        match self {
            Self::Default => Ok(build_default_analyzer()),
            Self::Language(name) => build_analyzer_from_name(name),
        }
    }

    /// Whether this is the language-agnostic pipeline.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for AnalyzerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnalyzerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
/// Returns an error if the language is not recognized.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(IndexError::InvalidLanguage(other.to_string())),
    }
}

/// Builds a stemming analyzer for the specified language.
pub fn build_analyzer(language: Language) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(Stemmer::new(language))
        .build()
}

/// Builds a stemming analyzer from a language name string.
pub fn build_analyzer_from_name(language_name: &str) -> Result<TextAnalyzer, IndexError> {
    let language = parse_language(language_name)?;
    Ok(build_analyzer(language))
}

/// Builds the language-agnostic analyzer.
pub fn build_default_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(AsciiFoldingFilter)
        .build()
}

/// Registers the default analyzer and every given stemming analyzer with an index.
pub fn register_analyzers<'a>(
    index: &Index,
    analyzers: impl IntoIterator<Item = &'a AnalyzerId>,
) -> Result<(), IndexError> {
    let tokenizers = index.tokenizers();
    tokenizers.register(
        &AnalyzerId::Default.tokenizer_name(),
        build_default_analyzer(),
    );
    for analyzer in analyzers {
        tokenizers.register(&analyzer.tokenizer_name(), analyzer.build()?);
    }
    Ok(())
}

/// Runs text through an analyzer and collects the token texts.
pub fn tokenize(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(token.text.clone());
    }
    tokens
}
