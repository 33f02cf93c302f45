//! Term dictionary expansion with Levenshtein automata.
//!
//! Shows which indexed name terms a fuzzy or prefix clause actually reaches.

use std::{collections::BTreeSet, str};

use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder, SINK_STATE};
use serde::Serialize;
use tantivy::{Searcher, schema::Field};
use tantivy_fst::Automaton;

use crate::BackendError;

/// Wrapper that implements `tantivy_fst::Automaton` for `levenshtein_automata::DFA`.
struct LevenshteinDfa(DFA);

impl Automaton for LevenshteinDfa {
    type State = u32;

    fn start(&self) -> Self::State {
        self.0.initial_state()
    }

    fn is_match(&self, state: &Self::State) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &Self::State) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &Self::State, byte: u8) -> Self::State {
        self.0.transition(*state, byte)
    }
}

/// Indexed terms reached by one query term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermExpansion {
    /// Query term.
    pub term: String,
    /// Edit distance allowed.
    pub distance: u8,
    /// Whether the term was matched as a prefix.
    pub prefix: bool,
    /// Indexed terms matched, sorted.
    pub matches: Vec<String>,
}

/// Streams the term dictionary of `field` through a Levenshtein automaton.
pub(crate) fn expand_term(
    searcher: &Searcher,
    field: Field,
    term: &str,
    distance: u8,
    prefix: bool,
) -> Result<TermExpansion, BackendError> {
    let builder = LevenshteinAutomatonBuilder::new(distance, true);
    let mut matches = BTreeSet::new();

    for segment_reader in searcher.segment_readers() {
        let inverted_index = segment_reader
            .inverted_index(field)
            .map_err(|e| BackendError::new(e.to_string()))?;
        let term_dict = inverted_index.terms();

        let dfa = if prefix {
            builder.build_prefix_dfa(term)
        } else {
            builder.build_dfa(term)
        };
        let mut stream = term_dict
            .search(LevenshteinDfa(dfa))
            .into_stream()
            .map_err(|e| BackendError::new(e.to_string()))?;

        while stream.advance() {
            if let Ok(matched) = str::from_utf8(stream.key()) {
                matches.insert(matched.to_string());
            }
        }
    }

    Ok(TermExpansion {
        term: term.to_string(),
        distance,
        prefix,
        matches: matches.into_iter().collect(),
    })
}
