use boltzpost::core::models::document::Format;
use boltzpost::workflows::renumber::RenumberJob;
use boltzpost::workflows::split::SplitJob;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;

/// Input format selection; `auto` detects from content, then extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Auto,
    Mmcif,
    Pdb,
}

impl FormatChoice {
    pub fn format(self) -> Option<Format> {
        match self {
            FormatChoice::Auto => None,
            FormatChoice::Mmcif => Some(Format::Mmcif),
            FormatChoice::Pdb => Some(Format::Pdb),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenumberConfig {
    pub inputs: Vec<PathBuf>,
    pub start_index: i64,
    pub chain: Option<String>,
    pub output: Option<PathBuf>,
    pub format: FormatChoice,
    pub output_suffix: String,
}

impl RenumberConfig {
    pub fn jobs(&self) -> Vec<RenumberJob> {
        self.inputs
            .iter()
            .map(|input| {
                let mut job = RenumberJob::new(input, self.start_index);
                job.chain = self.chain.clone();
                job.output = self.output.clone();
                job.format = self.format.format();
                job.output_suffix = self.output_suffix.clone();
                job
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub inputs: Vec<PathBuf>,
    pub sample: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub write_csv: bool,
}

impl SplitConfig {
    pub fn jobs(&self) -> Vec<SplitJob> {
        self.inputs
            .iter()
            .map(|input| {
                let mut job = SplitJob::new(input);
                job.sample = self.sample;
                job.output_dir = self.output_dir.clone();
                job.write_csv = self.write_csv;
                job
            })
            .collect()
    }
}
