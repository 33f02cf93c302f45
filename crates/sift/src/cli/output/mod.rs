//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use sift_index::{ClauseSpec, Explanation, RankedResultSet, ScoredResult};

/// JSON output for a single query's results.
#[derive(Serialize)]
struct JsonQueryResults<'a> {
    /// The normalized query.
    query: &'a str,
    /// Requested locale.
    locale: &'a str,
    /// Ranked results.
    results: &'a [ScoredResult],
    /// Number of results returned.
    total_matches: usize,
}

/// JSON output for `sift search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// Ranking fingerprint the scores were produced under.
    fingerprint: &'a str,
    /// Results grouped by query.
    queries: Vec<JsonQueryResults<'a>>,
}

/// Prints a value as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints ranked results for every query as JSON.
pub fn output_results_json(sets: &[RankedResultSet], fingerprint: &str) -> ExitCode {
    let output = JsonSearchOutput {
        fingerprint,
        queries: sets
            .iter()
            .map(|set| JsonQueryResults {
                query: &set.query,
                locale: &set.locale,
                results: set.results(),
                total_matches: set.len(),
            })
            .collect(),
    };
    print_json(&output)
}

/// Prints an explanation as JSON.
pub fn output_explanation_json(explanation: &Explanation) -> ExitCode {
    print_json(explanation)
}

/// Formats a score for tables.
fn score_cell(score: f32) -> Cell {
    Cell::new(format!("{score:.3}")).set_alignment(CellAlignment::Right)
}

/// Renders one query's results as a table.
pub fn results_table(set: &RankedResultSet, verbose: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec!["#", "Score", "Name", "Locale", "Slug"];
    if verbose {
        header.extend(["Text", "Popularity", "Clauses"]);
    }
    table.set_header(header);

    for (rank, result) in set.iter().enumerate() {
        let name = if result.exact_match {
            format!("{} *", result.name)
        } else {
            result.name.clone()
        };
        let mut row = vec![
            Cell::new(rank + 1),
            score_cell(result.score),
            Cell::new(name),
            Cell::new(&result.locale),
            Cell::new(&result.slug),
        ];
        if verbose {
            let clauses = result
                .clauses
                .iter()
                .map(|c| format!("{}={:.3}", c.kind.as_str(), c.score))
                .collect::<Vec<_>>()
                .join(" ");
            row.extend([
                score_cell(result.text_score),
                score_cell(result.popularity),
                Cell::new(clauses),
            ]);
        }
        table.add_row(row);
    }
    table
}

/// Prints ranked results for every query as tables.
pub fn output_results(sets: &[RankedResultSet], verbose: bool) {
    for (i, set) in sets.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("Query: {} [{}]", set.query, set.locale);
        if set.is_empty() {
            println!("   (no results)");
            continue;
        }
        println!("{}", results_table(set, verbose));
    }
}

/// Describes the parameters of a planned clause.
fn clause_detail(spec: &ClauseSpec) -> String {
    match spec {
        ClauseSpec::NameExact { locale } => format!("locale={locale}"),
        ClauseSpec::NamePhrase { slop } => format!("slop={slop}"),
        ClauseSpec::NameFuzzy { terms } => terms
            .iter()
            .map(|t| format!("{}~{}", t.text, t.distance))
            .collect::<Vec<_>>()
            .join(" "),
        ClauseSpec::NamePrefix { prefix } => format!("{prefix}*"),
        ClauseSpec::NameCompound { terms, min_part } => format!("{} parts>={min_part}", terms.join(" ")),
        ClauseSpec::NameMatch | ClauseSpec::Summary | ClauseSpec::Description => String::new(),
    }
}

/// Prints an explanation as text.
pub fn output_explanation(explanation: &Explanation) {
    println!("Fingerprint: {}", explanation.fingerprint);
    let Some(request) = &explanation.request else {
        println!("Query has no searchable terms.");
        return;
    };

    println!("Query: {} [{}]", request.query, request.locale);
    println!("Analyzer: {}", request.analyzer);
    println!("Terms: {}", request.terms.join(" "));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Clause", "Boost", "Detail"]);
    for clause in &request.clauses {
        table.add_row(vec![
            Cell::new(clause.kind().as_str()),
            score_cell(clause.boost()),
            Cell::new(clause_detail(clause.spec())),
        ]);
    }
    println!("{table}");

    if explanation.expansions.is_empty() {
        return;
    }
    println!();
    println!("Expansions:");
    for expansion in &explanation.expansions {
        let marker = if expansion.prefix {
            format!("{}*", expansion.term)
        } else {
            format!("{}~{}", expansion.term, expansion.distance)
        };
        let matches = if expansion.matches.is_empty() {
            "(none)".to_string()
        } else {
            expansion.matches.join(", ")
        };
        println!("   {marker}: {matches}");
    }
}
