use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::renumber::RenumberError;
use crate::engine::split::SplitError;
use crate::core::io::error::ParseError;

/// Failures of a file-level workflow, each tied to the file involved.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid prediction response in '{}': {source}", path.display())]
    Response {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {artifact}: {source}")]
    Serialize {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write table '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Renumbering '{}' failed: {source}", path.display())]
    Renumber {
        path: PathBuf,
        #[source]
        source: RenumberError,
    },

    #[error("Splitting '{}' failed: {source}", path.display())]
    Split {
        path: PathBuf,
        #[source]
        source: SplitError,
    },
}
