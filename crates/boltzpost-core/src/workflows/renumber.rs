use super::error::WorkflowError;
use crate::core::io::detect::detect_format;
use crate::core::io::error::ParseError;
use crate::core::io::{self, samples};
use crate::core::models::document::Format;
use crate::engine::renumber::{RenumberPlan, renumber};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_renumbered";

/// One file to renumber.
#[derive(Debug, Clone)]
pub struct RenumberJob {
    pub input: PathBuf,
    /// Defaults to the input name with `output_suffix` appended to its stem.
    pub output: Option<PathBuf>,
    pub start_index: i64,
    pub chain: Option<String>,
    /// Detected from content and extension when `None`.
    pub format: Option<Format>,
    pub output_suffix: String,
}

impl RenumberJob {
    pub fn new(input: impl Into<PathBuf>, start_index: i64) -> Self {
        Self {
            input: input.into(),
            output: None,
            start_index,
            chain: None,
            format: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input, &self.output_suffix))
    }
}

#[derive(Debug, Clone)]
pub struct RenumberOutcome {
    pub output: PathBuf,
    pub format: Format,
    /// One plan per data block.
    pub plans: Vec<RenumberPlan>,
    pub rows_changed: usize,
}

/// `dir/model.cif` becomes `dir/model<suffix>.cif`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

pub(crate) fn read_text(path: &Path) -> Result<String, WorkflowError> {
    let bytes = fs::read(path).map_err(|source| WorkflowError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| WorkflowError::Parse {
        path: path.to_path_buf(),
        source: ParseError::Encoding(e.utf8_error()),
    })
}

/// Renumbers one structure file and writes the result.
///
/// Each mmCIF data block is renumbered on its own with the same start index and chain
/// filter; a PDB file is a single document. Nothing is written when any block fails.
#[instrument(skip_all, name = "renumber_workflow", fields(input = %job.input.display()))]
pub fn run(job: &RenumberJob) -> Result<RenumberOutcome, WorkflowError> {
    let text = read_text(&job.input)?;
    let format = job
        .format
        .unwrap_or_else(|| detect_format(&text, Some(&job.input)));
    let blocks = match format {
        Format::Mmcif => samples::split_data_blocks(&text),
        Format::Pdb => vec![text.as_str()],
    };

    let mut output_text = String::with_capacity(text.len());
    let mut plans = Vec::with_capacity(blocks.len());
    let mut rows_changed = 0;
    for block in blocks {
        let mut doc = io::parse(block, format).map_err(|source| WorkflowError::Parse {
            path: job.input.clone(),
            source,
        })?;
        let summary = renumber(&mut doc, job.start_index, job.chain.as_deref()).map_err(|source| {
            WorkflowError::Renumber {
                path: job.input.clone(),
                source,
            }
        })?;
        rows_changed += summary.rows_changed();
        plans.push(summary.plan);
        output_text.push_str(&doc.to_string());
    }

    let output = job.output_path();
    fs::write(&output, output_text).map_err(|source| WorkflowError::Write {
        path: output.clone(),
        source,
    })?;
    info!(
        output = %output.display(),
        %format,
        blocks = plans.len(),
        rows = rows_changed,
        "Wrote renumbered structure."
    );

    Ok(RenumberOutcome {
        output,
        format,
        plans,
        rows_changed,
    })
}
