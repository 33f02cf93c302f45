//! sift: multilingual add-on ranking from the command line.
//!
//! Loads a JSON corpus of add-ons, indexes it in memory, and ranks it against
//! free-text queries in a requested locale. Ranking parameters come from `.sift.toml`
//! files discovered from the working directory upwards.

#![warn(missing_docs)]

pub mod cli;
