//! Validated, immutable document collections.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    slice,
};

use crate::{AddonDocument, CorpusError};

/// An immutable set of add-on documents, ordered by id.
///
/// Construction checks that ids are unique and that every document has a name in its
/// default locale. A corpus is never mutated after construction and can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Documents sorted by ascending id.
    documents: Vec<AddonDocument>,
    /// id -> position in `documents`.
    positions: HashMap<u64, usize>,
}

impl Corpus {
    /// Validates documents and builds a corpus.
    pub fn new(mut documents: Vec<AddonDocument>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id) {
                return Err(CorpusError::DuplicateId(doc.id));
            }
            if doc.default_locale.trim().is_empty() {
                return Err(CorpusError::EmptyDefaultLocale { id: doc.id });
            }
            if doc.default_name().is_none() {
                return Err(CorpusError::MissingDefaultName {
                    id: doc.id,
                    locale: doc.default_locale.clone(),
                });
            }
        }

        documents.sort_by_key(|doc| doc.id);
        let positions = documents
            .iter()
            .enumerate()
            .map(|(pos, doc)| (doc.id, pos))
            .collect();

        Ok(Self {
            documents,
            positions,
        })
    }

    /// Parses a JSON array of documents.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let documents: Vec<AddonDocument> = serde_json::from_str(json)?;
        Self::new(documents)
    }

    /// Reads a JSON corpus file.
    pub fn from_path(path: &Path) -> Result<Self, CorpusError> {
        let json = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Looks up a document by id.
    pub fn get(&self, id: u64) -> Option<&AddonDocument> {
        self.positions.get(&id).map(|&pos| &self.documents[pos])
    }

    /// Iterates documents in ascending id order.
    pub fn iter(&self) -> slice::Iter<'_, AddonDocument> {
        self.documents.iter()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a AddonDocument;
    type IntoIter = slice::Iter<'a, AddonDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_id() {
        let corpus = Corpus::new(vec![
            AddonDocument::new(9, "b", "en-US", "B"),
            AddonDocument::new(2, "a", "en-US", "A"),
        ])
        .unwrap();

        let ids: Vec<u64> = corpus.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(corpus.get(9).unwrap().slug, "b");
        assert!(corpus.get(5).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Corpus::new(vec![
            AddonDocument::new(1, "a", "en-US", "A"),
            AddonDocument::new(1, "b", "en-US", "B"),
        ])
        .unwrap_err();
        assert!(matches!(err, CorpusError::DuplicateId(1)));
    }

    #[test]
    fn rejects_missing_default_name() {
        let mut doc = AddonDocument::new(1, "a", "en-US", "A");
        doc.default_locale = "fr".into();

        let err = Corpus::new(vec![doc]).unwrap_err();
        assert!(
            matches!(err, CorpusError::MissingDefaultName { id: 1, ref locale } if locale == "fr")
        );
    }

    #[test]
    fn rejects_empty_default_locale() {
        let doc = AddonDocument::new(1, "a", "", "A");
        assert!(matches!(
            Corpus::new(vec![doc]).unwrap_err(),
            CorpusError::EmptyDefaultLocale { id: 1 }
        ));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        assert!(matches!(
            Corpus::from_json("[{\"id\": 1}]").unwrap_err(),
            CorpusError::Parse(_)
        ));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(
            &path,
            r#"[{"id": 1, "slug": "a", "default_locale": "en-US", "name": {"en-US": "A"}}]"#,
        )
        .unwrap();

        let corpus = Corpus::from_path(&path).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(matches!(
            Corpus::from_path(&dir.path().join("missing.json")).unwrap_err(),
            CorpusError::Read { .. }
        ));
    }
}
