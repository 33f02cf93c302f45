//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::RangedU64ValueParser};

/// Locale used when `--lang` is not given.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Multilingual add-on ranking")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Corpus and locale flags shared by query commands.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// JSON corpus of add-on documents
    #[arg(short = 'c', long)]
    pub corpus: PathBuf,

    /// Locale to rank and display results in
    #[arg(short = 'l', long = "lang", default_value = DEFAULT_LOCALE)]
    pub locale: String,
}

/// Arguments for `sift search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Search queries, each ranked separately
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Corpus and locale.
    pub query: QueryArgs,

    /// Maximum results per query [default: ranking.limit]
    #[arg(short = 'n', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub limit: Option<usize>,

    /// Show the per-clause score breakdown
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift explain`.
#[derive(Args, Debug, Clone)]
pub struct ExplainCommand {
    /// Query to explain
    pub text: String,

    #[command(flatten)]
    /// Corpus and locale.
    pub query: QueryArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    /// Also validate a JSON corpus
    #[arg(short = 'c', long)]
    pub corpus: Option<PathBuf>,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Rank a corpus against queries
    #[command(after_help = "\
EXAMPLES:
  sift search -c addons.json 'tab center redux'
  sift search -c addons.json --lang fr 'bloqueur de pub'
  sift search -c addons.json -n 3 --json privacy flash")]
    Search(SearchCommand),

    /// Show the planned clauses and fuzzy term expansions for a query
    Explain(ExplainCommand),

    /// Validate configuration and, optionally, a corpus
    Check(CheckCommand),

    /// Show effective configuration settings
    Config,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_defaults() {
        let cli = Cli::try_parse_from(["sift", "search", "-c", "a.json", "no flash"]).unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.queries, vec!["no flash"]);
        assert_eq!(cmd.query.locale, DEFAULT_LOCALE);
        assert_eq!(cmd.limit, None);
        assert!(!cmd.json);
    }

    #[test]
    fn search_requires_corpus() {
        assert!(Cli::try_parse_from(["sift", "search", "flash"]).is_err());
    }

    #[test]
    fn search_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["sift", "search", "-c", "a.json", "-n", "0", "x"]).is_err());

        let cli = Cli::try_parse_from(["sift", "search", "-c", "a.json", "-n", "3", "x"]).unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.limit, Some(3));
    }

    #[test]
    fn explain_takes_lang() {
        let cli =
            Cli::try_parse_from(["sift", "explain", "-c", "a.json", "--lang", "fr", "x"]).unwrap();
        let Commands::Explain(cmd) = cli.command else {
            panic!("expected explain");
        };
        assert_eq!(cmd.query.locale, "fr");
        assert_eq!(cmd.text, "x");
    }
}
