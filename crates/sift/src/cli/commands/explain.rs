//! Implementation of `sift explain`.

use std::process::ExitCode;

use sift_index::SearchQuery;

use crate::cli::{
    args::ExplainCommand,
    context::CommandContext,
    output::{output_explanation, output_explanation_json},
};

/// Prints how a query would be planned and which index terms it reaches.
pub fn run(ctx: &CommandContext, cmd: &ExplainCommand) -> ExitCode {
    let engine = match ctx.engine(&cmd.query.corpus) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let query = SearchQuery::new(cmd.text.as_str(), cmd.query.locale.as_str());
    let explanation = match engine.explain(&query) {
        Ok(explanation) => explanation,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return output_explanation_json(&explanation);
    }
    output_explanation(&explanation);
    ExitCode::SUCCESS
}
