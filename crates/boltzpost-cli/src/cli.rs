use crate::config::models::FormatChoice;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "boltzpost - Post-processing for predicted biomolecular structures: residue renumbering and per-sample artifact splitting.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to process input files in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shift residue numbering so the selected residues start at a given index.
    Renumber(RenumberArgs),
    /// Split a prediction into per-sample structure, confidence and matrix files.
    Split(SplitArgs),
}

/// Arguments for the `renumber` subcommand.
#[derive(Args, Debug)]
pub struct RenumberArgs {
    /// Structure files to renumber (mmCIF or PDB).
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// The number the first residue in scope receives. May be negative.
    #[arg(short, long, required = true, allow_hyphen_values = true, value_name = "INT")]
    pub start: String,

    /// Only renumber residues of this chain: the mmCIF label chain ID (`label_asym_id`),
    /// or the chain identifier column of a PDB file.
    #[arg(long, value_name = "ID")]
    pub chain: Option<String>,

    /// Output path. Only valid with a single input; defaults to `<stem>_renumbered.<ext>`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Input format, overriding the configuration file.
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<FormatChoice>,
}

/// Arguments for the `split` subcommand.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Structure files or JSON prediction responses to split.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Only write artifacts for this sample (1-based).
    #[arg(short, long, value_name = "INDEX")]
    pub sample: Option<usize>,

    /// Directory for the artifacts; defaults to the directory of each input.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub csv: CsvOutput,
}

/// Mutually exclusive flags overriding `split.csv` from the config file.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct CsvOutput {
    /// Also write residue scores and pairwise matrices as CSV.
    #[arg(long)]
    pub csv: bool,
    /// Do not write CSV files.
    #[arg(long)]
    pub no_csv: bool,
}

impl CsvOutput {
    pub fn choice(self) -> Option<bool> {
        match (self.csv, self.no_csv) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }
}
