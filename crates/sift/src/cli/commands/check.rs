//! Implementation of `sift check`.

use std::process::ExitCode;

use sift_config::{ConfigWarning, discover_config_files};
use sift_index::compute_fingerprint;

use crate::cli::{args::CheckCommand, context::CommandContext};

/// Exit codes for `sift check`.
mod exit_codes {
    /// Configuration and corpus are usable as-is.
    pub const OK: u8 = 0;
    /// Usable, but with warnings worth reviewing.
    pub const WARNINGS: u8 = 1;
    /// The corpus could not be loaded or indexed.
    pub const ERROR: u8 = 2;
}

/// Returns a remedy for a configuration warning.
fn hint(warning: &ConfigWarning) -> &'static str {
    match warning {
        ConfigWarning::ExactBoostNotDominant { .. } => {
            "raise ranking.name_exact_boost so exact names outrank phrase matches"
        }
        ConfigWarning::ClauseDisabled { .. } => "set a positive boost to re-enable the clause",
        ConfigWarning::FuzzyDisabled => "set ranking.fuzzy_distance to 1 or 2",
        ConfigWarning::CandidateLimitBelowLimit { .. } => {
            "raise ranking.candidate_limit to at least ranking.limit"
        }
    }
}

/// Validates configuration and, when given, a corpus.
pub fn run(ctx: &CommandContext, cmd: &CheckCommand) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);
    if config_files.is_empty() {
        println!("Config: defaults (no .sift.toml found)");
    } else {
        println!("Config files:");
        for path in &config_files {
            println!("   {}", path.display());
        }
    }
    println!("Fingerprint: {}", compute_fingerprint(&ctx.config));

    let warnings = ctx.config.validate();
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("   {warning}");
            println!("      hint: {}", hint(warning));
        }
    }

    if let Some(path) = &cmd.corpus {
        let Ok(engine) = ctx.engine(path) else {
            return ExitCode::from(exit_codes::ERROR);
        };
        println!();
        println!(
            "Corpus: {} documents indexed from {}",
            engine.corpus().len(),
            path.display()
        );
    }

    if warnings.is_empty() {
        ExitCode::from(exit_codes::OK)
    } else {
        ExitCode::from(exit_codes::WARNINGS)
    }
}
