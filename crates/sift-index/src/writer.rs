//! Index writer for adding add-on documents to the Tantivy index.

use std::{fs, path::Path};

use tantivy::{
    Index, IndexWriter as TantivyIndexWriter, TantivyDocument, directory::MmapDirectory,
};

use crate::{
    AddonDocument, Corpus,
    analyzer::register_analyzers,
    error::IndexError,
    locale::LocaleResolver,
    planner::normalize,
    request::SearchField,
    schema::{IndexSchema, exact_term},
};

/// Default heap size for the index writer (50 MB).
const DEFAULT_HEAP_SIZE: usize = 50_000_000;

/// Placeholder path reported for in-memory indexes.
const MEMORY_PATH: &str = "<memory>";

/// Writes add-on documents to a Tantivy index.
///
/// Every translation is indexed into the default-analyzer fields, and also into the
/// fields of the stemming analyzer its locale resolves to.
pub struct IndexWriter {
    /// The Tantivy index.
    index: Index,
    /// The underlying Tantivy writer.
    writer: TantivyIndexWriter,
    /// Schema with field handles.
    schema: IndexSchema,
    /// Decides which localized fields a translation goes into.
    resolver: LocaleResolver,
}

impl IndexWriter {
    /// Creates a writer over a fresh in-memory index.
    pub fn in_ram(resolver: &LocaleResolver) -> Result<Self, IndexError> {
        let schema = IndexSchema::new(&resolver.analyzers());
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, resolver, Path::new(MEMORY_PATH))
    }

    /// Opens or creates an on-disk index at the given path.
    ///
    /// An existing index must have been built with the same analyzer bindings.
    pub fn open(path: &Path, resolver: &LocaleResolver) -> Result<Self, IndexError> {
        let schema = IndexSchema::new(&resolver.analyzers());

        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: tantivy::TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;

        let index = Index::open_or_create(dir, schema.schema().clone())
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        Self::from_index(index, schema, resolver, path)
    }

    /// Registers analyzers and creates the Tantivy writer.
    fn from_index(
        index: Index,
        schema: IndexSchema,
        resolver: &LocaleResolver,
        path: &Path,
    ) -> Result<Self, IndexError> {
        register_analyzers(&index, schema.analyzers())?;

        let writer = index
            .writer(DEFAULT_HEAP_SIZE)
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        Ok(Self {
            index,
            writer,
            schema,
            resolver: resolver.clone(),
        })
    }

    /// Adds an add-on document to the index.
    ///
    /// The document is staged for writing but not committed until [`commit`] is called.
    ///
    /// [`commit`]: Self::commit
    pub fn add_document(&mut self, doc: &AddonDocument) -> Result<(), IndexError> {
        let mut tantivy_doc = TantivyDocument::new();

        tantivy_doc.add_u64(self.schema.id, doc.id);
        tantivy_doc.add_u64(self.schema.popularity, doc.popularity_signal());

        for (field, translations) in [
            (SearchField::Name, &doc.name),
            (SearchField::Summary, &doc.summary),
            (SearchField::Description, &doc.description),
        ] {
            for (locale, text) in translations {
                tantivy_doc.add_text(self.schema.default.get(field), text);
                let analyzer = self.resolver.resolve_analyzer(locale);
                if !analyzer.is_default()
                    && let Some(fields) = self.schema.text_fields(&analyzer)
                {
                    tantivy_doc.add_text(fields.get(field), text);
                }
            }
        }

        for (locale, name) in &doc.name {
            tantivy_doc.add_text(self.schema.name_exact, exact_term(locale, &normalize(name)));
            tantivy_doc.add_text(self.schema.locales, locale);
        }
        if let Some(name) = doc.default_name() {
            tantivy_doc.add_text(self.schema.name_exact_default, normalize(name));
        }

        self.writer
            .add_document(tantivy_doc)
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Adds every document of a corpus.
    pub fn add_corpus(&mut self, corpus: &Corpus) -> Result<(), IndexError> {
        for doc in corpus {
            self.add_document(doc)?;
        }
        Ok(())
    }

    /// Commits all pending changes to the index.
    ///
    /// This makes all added and deleted documents visible to readers.
    pub fn commit(&mut self) -> Result<(), IndexError> {
        self.writer.commit().map_err(|e| IndexError::commit(&e))?;
        Ok(())
    }

    /// Deletes all documents from the index.
    pub fn delete_all(&mut self) -> Result<(), IndexError> {
        self.writer
            .delete_all_documents()
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Returns the number of committed documents in the index.
    pub fn num_docs(&self) -> Result<u64, IndexError> {
        let reader = self
            .index
            .reader()
            .map_err(|e| IndexError::Write(e.to_string()))?;
        Ok(reader.searcher().num_docs())
    }

    /// Finishes writing and hands back the index and its schema.
    ///
    /// Waits for merging threads so no background work outlives the writer.
    pub fn finish(self) -> Result<(Index, IndexSchema), IndexError> {
        self.writer
            .wait_merging_threads()
            .map_err(|e| IndexError::commit(&e))?;
        Ok((self.index, self.schema))
    }
}
