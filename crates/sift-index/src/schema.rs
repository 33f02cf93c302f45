//! Index schema definition for the sift search index.
//!
//! Defines the Tantivy schema:
//! - `id`: Document identifier (u64, indexed, stored, fast)
//! - `popularity`: popularity signal (u64, fast), read while selecting candidates
//! - `name`, `summary`, `description`: every translation, default analyzer
//! - `name_<lang>`, `summary_<lang>`, `description_<lang>`: translations whose locale is
//!   bound to the `<lang>` stemming analyzer
//! - `name_exact`: raw `locale\u{1f}normalized name` terms, one per translation
//! - `name_exact_default`: raw normalized default-locale name
//! - `locales`: raw locales the name is translated into

use std::collections::{BTreeMap, BTreeSet};

use tantivy::schema::{
    FAST, Field, INDEXED, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder,
    TextFieldIndexing, TextOptions,
};

use crate::{analyzer::AnalyzerId, request::SearchField};

/// Name of the document identifier field.
pub const ID_FIELD: &str = "id";

/// Name of the popularity signal fast field.
pub const POPULARITY_FIELD: &str = "popularity";

/// Separates the locale from the name in `name_exact` terms.
pub const EXACT_SEPARATOR: char = '\u{1f}';

/// Builds a `name_exact` term value.
pub fn exact_term(locale: &str, normalized_name: &str) -> String {
    format!("{locale}{EXACT_SEPARATOR}{normalized_name}")
}

/// Name, summary and description fields analyzed by one pipeline.
#[derive(Debug, Clone, Copy)]
pub struct TextFields {
    /// Name field.
    pub name: Field,
    /// Summary field.
    pub summary: Field,
    /// Description field.
    pub description: Field,
}

impl TextFields {
    /// Field for a document field.
    pub fn get(&self, field: SearchField) -> Field {
        match field {
            SearchField::Name => self.name,
            SearchField::Summary => self.summary,
            SearchField::Description => self.description,
        }
    }

    /// Adds the three fields with the given name suffix and tokenizer.
    fn add(builder: &mut SchemaBuilder, suffix: &str, tokenizer: &str) -> Self {
        let options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(tokenizer)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        Self {
            name: builder.add_text_field(&format!("name{suffix}"), options.clone()),
            summary: builder.add_text_field(&format!("summary{suffix}"), options.clone()),
            description: builder.add_text_field(&format!("description{suffix}"), options),
        }
    }
}

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Document identifier.
    pub id: Field,
    /// Popularity signal: average daily users, or weekly downloads for themes.
    pub popularity: Field,
    /// All translations, default analyzer.
    pub default: TextFields,
    /// Per stemming analyzer, translations bound to it.
    pub localized: BTreeMap<AnalyzerId, TextFields>,
    /// `locale\u{1f}normalized name` terms.
    pub name_exact: Field,
    /// Normalized default-locale name.
    pub name_exact_default: Field,
    /// Locales the name is translated into.
    pub locales: Field,
}

impl IndexSchema {
    /// Creates a schema with localized fields for each stemming analyzer.
    pub fn new(analyzers: &BTreeSet<AnalyzerId>) -> Self {
        let mut builder = Schema::builder();

        let id = builder.add_u64_field(ID_FIELD, INDEXED | STORED | FAST);
        let popularity = builder.add_u64_field(POPULARITY_FIELD, FAST);

        let default = TextFields::add(&mut builder, "", &AnalyzerId::Default.tokenizer_name());

        let localized = analyzers
            .iter()
            .filter(|analyzer| !analyzer.is_default())
            .map(|analyzer| {
                let suffix = format!("_{}", analyzer.as_str());
                let fields = TextFields::add(&mut builder, &suffix, &analyzer.tokenizer_name());
                (analyzer.clone(), fields)
            })
            .collect();

        let name_exact = builder.add_text_field("name_exact", STRING);
        let name_exact_default = builder.add_text_field("name_exact_default", STRING);
        let locales = builder.add_text_field("locales", STRING);

        Self {
            schema: builder.build(),
            id,
            popularity,
            default,
            localized,
            name_exact,
            name_exact_default,
            locales,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Fields analyzed by an analyzer, if the schema has them.
    pub fn text_fields(&self, analyzer: &AnalyzerId) -> Option<&TextFields> {
        match analyzer {
            AnalyzerId::Default => Some(&self.default),
            AnalyzerId::Language(_) => self.localized.get(analyzer),
        }
    }

    /// Stemming analyzers the schema has fields for.
    pub fn analyzers(&self) -> impl Iterator<Item = &AnalyzerId> {
        self.localized.keys()
    }
}
