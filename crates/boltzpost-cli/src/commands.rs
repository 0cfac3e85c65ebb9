pub mod renumber;
pub mod split;

use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use boltzpost::workflows::error::WorkflowError;
use std::path::PathBuf;
use tracing::error;

pub(crate) type FileResult<T> = (PathBuf, std::result::Result<T, WorkflowError>);

/// Prints one line per input and folds the failures into the command result.
///
/// A single failing input returns its own error; with several inputs every failure is
/// listed and the command fails with a count.
pub(crate) fn finish_batch<T>(
    results: Vec<FileResult<T>>,
    progress: &CliProgressHandler,
    describe: impl Fn(&T) -> String,
) -> Result<()> {
    let total = results.len();
    let mut failures = Vec::new();
    for (input, result) in results {
        match result {
            Ok(outcome) => progress.println(format!("✓ {}", describe(&outcome))),
            Err(e) => {
                error!(input = %input.display(), "{}", e);
                failures.push((input, e));
            }
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    if total == 1 {
        let (_, e) = failures.remove(0);
        return Err(CliError::Workflow(e));
    }
    for (input, e) in &failures {
        progress.println(format!("✗ {}: {}", input.display(), e));
    }
    Err(CliError::Batch {
        failed: failures.len(),
        total,
    })
}
