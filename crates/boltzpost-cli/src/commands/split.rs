use super::{FileResult, finish_batch};
use crate::cli::SplitArgs;
use crate::config::builder::build_split_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use boltzpost::engine::progress::ProgressReporter;
use boltzpost::workflows::split::{self, SplitOutcome};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

pub fn run(args: SplitArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let config = build_split_config(&args, config_path)?;
    let jobs = config.jobs();
    info!(
        files = jobs.len(),
        csv = config.write_csv,
        "Splitting predictions into per-sample artifacts."
    );

    let progress = if quiet {
        CliProgressHandler::hidden(jobs.len())
    } else {
        CliProgressHandler::new(jobs.len())
    };

    let results: Vec<FileResult<SplitOutcome>> = jobs
        .par_iter()
        .map(|job| {
            let reporter = ProgressReporter::with_callback(progress.file_callback(&job.input));
            let result = split::run(job, &reporter);
            progress.file_done();
            (job.input.clone(), result)
        })
        .collect();
    progress.finish();

    finish_batch(results, &progress, describe)
}

fn describe(outcome: &SplitOutcome) -> String {
    let directory = outcome
        .artifacts
        .first()
        .and_then(|artifact| artifact.path.parent())
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    format!(
        "{} sample(s), {} file(s) in '{}'",
        outcome.samples,
        outcome.artifacts.len(),
        directory
    )
}
