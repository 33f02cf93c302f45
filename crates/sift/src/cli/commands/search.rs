//! Implementation of `sift search`.

use std::process::ExitCode;

use sift_index::SearchQuery;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{output_results, output_results_json},
};

/// Ranks the corpus against each query and prints the results.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let engine = match ctx.engine(&cmd.query.corpus) {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let limit = cmd.limit.unwrap_or(ctx.config.ranking.limit);

    let mut sets = Vec::with_capacity(cmd.queries.len());
    for text in &cmd.queries {
        let query = SearchQuery::new(text.as_str(), cmd.query.locale.as_str());
        match engine.search_with_limit(&query, limit) {
            Ok(set) => sets.push(set),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cmd.json {
        return output_results_json(&sets, engine.fingerprint());
    }
    output_results(&sets, cmd.verbose);
    ExitCode::SUCCESS
}
