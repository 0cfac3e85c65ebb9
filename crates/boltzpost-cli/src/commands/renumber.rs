use super::{FileResult, finish_batch};
use crate::cli::RenumberArgs;
use crate::config::builder::build_renumber_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use boltzpost::workflows::renumber::{self, RenumberOutcome};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

pub fn run(args: RenumberArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let config = build_renumber_config(&args, config_path)?;
    let jobs = config.jobs();
    info!(
        files = jobs.len(),
        start = config.start_index,
        chain = config.chain.as_deref().unwrap_or("*"),
        "Renumbering residues."
    );

    let progress = if quiet {
        CliProgressHandler::hidden(jobs.len())
    } else {
        CliProgressHandler::new(jobs.len())
    };

    let results: Vec<FileResult<RenumberOutcome>> = jobs
        .par_iter()
        .map(|job| {
            let result = renumber::run(job);
            progress.file_done();
            (job.input.clone(), result)
        })
        .collect();
    progress.finish();

    finish_batch(results, &progress, describe)
}

fn describe(outcome: &RenumberOutcome) -> String {
    let offsets: Vec<String> = outcome
        .plans
        .iter()
        .map(|plan| format!("{:+}", plan.offset))
        .collect();
    format!(
        "{} ({}, offset {}, {} rows)",
        outcome.output.display(),
        outcome.format,
        offsets.join("/"),
        outcome.rows_changed
    )
}
