use super::error::WorkflowError;
use super::renumber::read_text;
use crate::core::io::detect::{detect_format, is_json};
use crate::core::io::response::PredictionResponse;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::split::{PairwiseMatrix, Prediction, ResidueScore, SampleArtifacts, split};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One prediction file to split.
#[derive(Debug, Clone)]
pub struct SplitJob {
    pub input: PathBuf,
    /// Defaults to the directory of the input.
    pub output_dir: Option<PathBuf>,
    /// 1-based sample to extract; all samples when `None`.
    pub sample: Option<usize>,
    pub write_csv: bool,
}

impl SplitJob {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            sample: None,
            write_csv: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Structure,
    Protein,
    Confidence,
    Matrices,
    Affinity,
    ScoresCsv,
    MatrixCsv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    /// `None` for artifacts shared by all samples.
    pub sample: Option<usize>,
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Samples in the prediction, selected or not.
    pub samples: usize,
    pub artifacts: Vec<WrittenArtifact>,
}

/// Loads a prediction from a structure file or a JSON response.
///
/// A structure file picks up a sibling `<stem>.json` response as metadata when one exists
/// and parses. Returns whether the input itself was a response.
pub fn load_prediction(input: &Path) -> Result<(Prediction, bool), WorkflowError> {
    let text = read_text(input)?;

    if is_json(&text) {
        let response = PredictionResponse::from_json(&text).map_err(|source| WorkflowError::Response {
            path: input.to_path_buf(),
            source,
        })?;
        let prediction = Prediction::from_response(response).map_err(|source| WorkflowError::Split {
            path: input.to_path_buf(),
            source,
        })?;
        return Ok((prediction, true));
    }

    let mut prediction = Prediction::from_structure_text(&text, detect_format(&text, Some(input)));
    let sibling = input.with_extension("json");
    if sibling != input && sibling.is_file() {
        match fs::read_to_string(&sibling)
            .ok()
            .and_then(|t| PredictionResponse::from_json(&t).ok())
        {
            Some(response) => {
                info!(metadata = %sibling.display(), "Using sibling response as metadata.");
                prediction = prediction.with_metadata(response);
            }
            None => warn!(metadata = %sibling.display(), "Ignoring unreadable sibling response."),
        }
    }
    Ok((prediction, false))
}

struct ArtifactWriter<'r, 'a> {
    dir: PathBuf,
    base: String,
    extension: &'static str,
    multi: bool,
    reporter: &'r ProgressReporter<'a>,
    written: Vec<WrittenArtifact>,
}

impl ArtifactWriter<'_, '_> {
    fn path(&self, sample: Option<usize>, suffix: &str) -> PathBuf {
        let name = match sample {
            Some(n) if self.multi => format!("{}_{n}{suffix}", self.base),
            _ => format!("{}{suffix}", self.base),
        };
        self.dir.join(name)
    }

    fn record(&mut self, sample: Option<usize>, kind: ArtifactKind, path: PathBuf) {
        info!(path = %path.display(), "Wrote artifact.");
        self.reporter.report(Progress::ArtifactWritten { path: path.clone() });
        self.written.push(WrittenArtifact { sample, kind, path });
    }

    fn text(&mut self, sample: Option<usize>, kind: ArtifactKind, suffix: &str, text: &str) -> Result<(), WorkflowError> {
        let path = self.path(sample, suffix);
        fs::write(&path, text).map_err(|source| WorkflowError::Write {
            path: path.clone(),
            source,
        })?;
        self.record(sample, kind, path);
        Ok(())
    }

    fn json<T: Serialize>(&mut self, sample: Option<usize>, kind: ArtifactKind, suffix: &str, value: &T) -> Result<(), WorkflowError> {
        let text = serde_json::to_string_pretty(value).map_err(|source| WorkflowError::Serialize {
            artifact: suffix.trim_start_matches('_').to_string(),
            source,
        })?;
        self.text(sample, kind, suffix, &text)
    }

    fn csv_rows<T: Serialize>(&mut self, sample: Option<usize>, kind: ArtifactKind, suffix: &str, rows: &[T]) -> Result<(), WorkflowError> {
        let path = self.path(sample, suffix);
        let csv_error = |source| WorkflowError::Csv {
            path: path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
        for row in rows {
            writer.serialize(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|source| WorkflowError::Write {
            path: path.clone(),
            source,
        })?;
        self.record(sample, kind, path);
        Ok(())
    }

    fn sample(&mut self, artifacts: &SampleArtifacts, full_structure: bool, write_csv: bool) -> Result<(), WorkflowError> {
        let n = Some(artifacts.sample);
        let extension = format!(".{}", self.extension);
        if full_structure {
            self.text(n, ArtifactKind::Structure, &extension, &artifacts.structure.to_string())?;
        }
        self.text(
            n,
            ArtifactKind::Protein,
            &format!("_protein{extension}"),
            &artifacts.protein.to_string(),
        )?;
        self.json(n, ArtifactKind::Confidence, "_confidence.json", &artifacts.confidence)?;
        if !artifacts.matrices.is_empty() {
            let matrices: BTreeMap<&str, &Vec<Vec<f64>>> = artifacts
                .matrices
                .iter()
                .map(|m: &PairwiseMatrix| (m.name.as_str(), &m.values))
                .collect();
            self.json(n, ArtifactKind::Matrices, "_matrices.json", &matrices)?;
        }

        if write_csv {
            let scores: &[ResidueScore] = &artifacts.confidence.residues;
            self.csv_rows(n, ArtifactKind::ScoresCsv, "_plddt.csv", scores)?;
            for matrix in &artifacts.matrices {
                self.csv_rows(n, ArtifactKind::MatrixCsv, &format!("_{}.csv", matrix.name), &matrix.values)?;
            }
        }
        Ok(())
    }
}

/// Splits one prediction file into per-sample artifact files.
///
/// Files are named after the input stem, with `_<n>` added for multi-sample predictions.
/// The complete structure is only written for response inputs, since a structure input
/// already is that file.
#[instrument(skip_all, name = "split_workflow", fields(input = %job.input.display()))]
pub fn run(job: &SplitJob, reporter: &ProgressReporter) -> Result<SplitOutcome, WorkflowError> {
    reporter.report(Progress::PhaseStart { name: "Loading" });
    let (prediction, from_response) = load_prediction(&job.input)?;
    reporter.report(Progress::PhaseFinish);

    let artifacts = split(&prediction, job.sample).map_err(|source| WorkflowError::Split {
        path: job.input.clone(),
        source,
    })?;

    let dir = match &job.output_dir {
        Some(dir) => dir.clone(),
        None => job
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(&dir).map_err(|source| WorkflowError::Write {
            path: dir.clone(),
            source,
        })?;
    }

    let mut writer = ArtifactWriter {
        dir,
        base: job
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prediction".to_string()),
        extension: prediction.format().extension(),
        multi: prediction.sample_count() > 1,
        reporter,
        written: Vec::new(),
    };

    reporter.report(Progress::PhaseStart { name: "Writing samples" });
    reporter.report(Progress::TaskStart {
        total_steps: artifacts.len() as u64,
    });
    for sample in &artifacts {
        writer.sample(sample, from_response, job.write_csv)?;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    if let Some(affinity) = artifacts.iter().find_map(|a| a.affinity.as_ref()) {
        writer.json(None, ArtifactKind::Affinity, "_affinity.json", affinity)?;
    }
    reporter.report(Progress::PhaseFinish);

    info!(
        samples = artifacts.len(),
        files = writer.written.len(),
        "Split prediction."
    );
    Ok(SplitOutcome {
        samples: prediction.sample_count(),
        artifacts: writer.written,
    })
}
