use crate::core::io::detect::detect_format;
use crate::core::io::error::ParseError;
use crate::core::io::response::{MATRIX_KEYS, PredictionResponse};
use crate::core::io::{self, samples};
use crate::core::models::document::{Format, Segment, StructureDocument};
use crate::core::models::ids::TableId;
use crate::core::models::record::{RecordClass, RecordKind};
use crate::core::models::schema::{ATOM_SITE, QA_METRIC_LOCAL};
use crate::core::models::table::Table;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Sample {requested} is out of range: the prediction has {available} sample(s)")]
    SampleOutOfRange { requested: usize, available: usize },

    #[error("The prediction contains no structure")]
    MissingStructure,

    #[error("Failed to parse sample {sample}: {source}")]
    Parse {
        sample: usize,
        #[source]
        source: ParseError,
    },
}

/// A prediction's structure samples and, when available, the service response they came with.
#[derive(Debug, Clone)]
pub struct Prediction {
    format: Format,
    samples: Vec<String>,
    metadata: Option<PredictionResponse>,
}

impl Prediction {
    /// Wraps structure text, splitting it into one text per sample.
    pub fn from_structure_text(text: &str, format: Format) -> Self {
        Self {
            format,
            samples: samples::split_samples(text, format),
            metadata: None,
        }
    }

    /// Builds a prediction from the structures embedded in a response.
    ///
    /// Each entry of `structures` is one sample, unless an entry itself holds several
    /// data blocks or models.
    pub fn from_response(response: PredictionResponse) -> Result<Self, SplitError> {
        let mut format = None;
        let mut texts = Vec::new();
        for (text, declared) in response.structure_texts() {
            let detected = declared.unwrap_or_else(|| detect_format(text, None));
            if format.is_some_and(|f| f != detected) {
                warn!(
                    "Response mixes structure formats; treating every sample as {}.",
                    format.unwrap_or(detected)
                );
            }
            let f = *format.get_or_insert(detected);
            texts.extend(samples::split_samples(text, f));
        }
        let format = format.ok_or(SplitError::MissingStructure)?;
        Ok(Self {
            format,
            samples: texts,
            metadata: Some(response),
        })
    }

    pub fn with_metadata(mut self, metadata: PredictionResponse) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn metadata(&self) -> Option<&PredictionResponse> {
        self.metadata.as_ref()
    }
}

/// Where per-residue scores were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSource {
    QaMetric,
    BFactor,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueScore {
    pub chain: String,
    /// `None` for residues without a sequence position, such as ligands.
    pub residue: Option<i64>,
    pub name: Option<String>,
    pub score: f64,
}

/// Confidence of one sample: per-residue scores plus the response's summary scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceRecord {
    pub sample: usize,
    pub source: ScoreSource,
    pub residues: Vec<ResidueScore>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub summary: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseMatrix {
    pub name: String,
    pub values: Vec<Vec<f64>>,
}

/// Binding affinity predictions, kept as the response reported them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AffinityRecord(pub Value);

/// Everything extracted from one sample.
#[derive(Debug, Clone)]
pub struct SampleArtifacts {
    /// 1-based sample number.
    pub sample: usize,
    pub structure: StructureDocument,
    pub protein: StructureDocument,
    pub confidence: ConfidenceRecord,
    pub matrices: Vec<PairwiseMatrix>,
    pub affinity: Option<AffinityRecord>,
}

/// Splits a prediction into per-sample artifacts.
///
/// `sample` selects one 1-based sample; `None` yields every sample.
///
/// # Errors
///
/// Returns an error when the prediction has no structure, the requested sample does not
/// exist, or a sample fails to parse.
pub fn split(prediction: &Prediction, sample: Option<usize>) -> Result<Vec<SampleArtifacts>, SplitError> {
    let available = prediction.sample_count();
    if available == 0 {
        return Err(SplitError::MissingStructure);
    }
    let selected: Vec<usize> = match sample {
        Some(n) if (1..=available).contains(&n) => vec![n],
        Some(n) => {
            return Err(SplitError::SampleOutOfRange {
                requested: n,
                available,
            });
        }
        None => (1..=available).collect(),
    };

    selected
        .into_iter()
        .map(|n| split_sample(prediction, n, available))
        .collect()
}

fn split_sample(prediction: &Prediction, sample: usize, available: usize) -> Result<SampleArtifacts, SplitError> {
    let text = &prediction.samples()[sample - 1];
    let structure =
        io::parse(text, prediction.format()).map_err(|source| SplitError::Parse { sample, source })?;
    let protein = protein_only(&structure);
    let (source, residues) = residue_scores(&structure);
    let metadata = prediction.metadata();

    let confidence = ConfidenceRecord {
        sample,
        source,
        residues,
        summary: metadata
            .map(|m| m.summary_for(sample - 1, available))
            .unwrap_or_default(),
    };
    let matrices = metadata
        .map(|m| matrices_for(m, sample - 1, available))
        .unwrap_or_default();
    let affinity = metadata
        .and_then(PredictionResponse::affinity)
        .cloned()
        .map(AffinityRecord);

    debug!(
        sample,
        residues = confidence.residues.len(),
        matrices = matrices.len(),
        "Split sample."
    );
    Ok(SampleArtifacts {
        sample,
        structure,
        protein,
        confidence,
        matrices,
        affinity,
    })
}

fn matrices_for(response: &PredictionResponse, index: usize, samples: usize) -> Vec<PairwiseMatrix> {
    MATRIX_KEYS
        .iter()
        .filter_map(|&key| {
            let value = response.field(key)?;
            let grid = decode_matrix(key, value, index, samples)?;
            Some(PairwiseMatrix {
                name: key.to_string(),
                values: grid,
            })
        })
        .collect()
}

/// Accepts one grid shared by all samples or one grid per sample.
fn decode_matrix(key: &str, value: &Value, index: usize, samples: usize) -> Option<Vec<Vec<f64>>> {
    if let Ok(grid) = serde_json::from_value::<Vec<Vec<f64>>>(value.clone()) {
        return (!grid.is_empty()).then_some(grid);
    }
    match serde_json::from_value::<Vec<Vec<Vec<f64>>>>(value.clone()) {
        Ok(mut grids) if grids.len() == samples => Some(grids.swap_remove(index)),
        Ok(grids) => {
            warn!(
                matrix = key,
                grids = grids.len(),
                samples,
                "Matrix count does not match the sample count; skipping."
            );
            None
        }
        Err(_) => {
            debug!(matrix = key, "Field is not a numeric matrix; skipping.");
            None
        }
    }
}

/// Chains whose coordinate rows are all heteroatoms.
fn heteroatom_chains(doc: &StructureDocument) -> HashSet<String> {
    let Some(table) = doc.table(ATOM_SITE) else {
        return HashSet::new();
    };
    let Some(chain_col) = table.chain_column() else {
        return HashSet::new();
    };
    let mut hetero = HashSet::new();
    let mut polymer = HashSet::new();
    for (index, row) in table.rows().iter().enumerate() {
        let chain = table.value(index, chain_col).unwrap_or_default().to_string();
        match row.class() {
            Some(RecordClass::Heteroatom) => hetero.insert(chain),
            _ => polymer.insert(chain),
        };
    }
    &hetero - &polymer
}

fn keep_row(table: &Table, index: usize, dropped_chains: &HashSet<String>) -> bool {
    if table.rows()[index].class() == Some(RecordClass::Heteroatom) {
        return false;
    }
    if table.name() == ATOM_SITE || dropped_chains.is_empty() {
        return true;
    }
    table
        .chain_column()
        .and_then(|c| table.value(index, c))
        .is_none_or(|chain| !dropped_chains.contains(chain))
}

/// Copy of `doc` without heteroatom rows.
///
/// Rows of other tables that belong to heteroatom-only chains go with them; a table
/// emptied this way disappears together with its header. Everything else is unchanged.
pub fn protein_only(doc: &StructureDocument) -> StructureDocument {
    let dropped_chains = heteroatom_chains(doc);
    let mut out = StructureDocument::new(doc.format());
    // Old table id -> new id and prefix counts of kept rows.
    let mut kept: HashMap<TableId, (TableId, Vec<usize>)> = HashMap::new();

    for (id, table) in doc.tables() {
        let mut prefix = Vec::with_capacity(table.len() + 1);
        let mut rows = Vec::new();
        prefix.push(0);
        for (index, row) in table.rows().iter().enumerate() {
            if keep_row(table, index, &dropped_chains) {
                rows.push(row.clone());
            }
            prefix.push(rows.len());
        }
        if rows.is_empty() && !table.is_empty() {
            continue;
        }
        let new_id = out.add_table(table.with_rows(rows));
        kept.insert(id, (new_id, prefix));
    }

    for segment in doc.segments() {
        match segment {
            Segment::Raw(text) => out.push_raw(text),
            Segment::Table { id, rows } => {
                let Some((new_id, prefix)) = kept.get(id) else {
                    continue;
                };
                let range = prefix[rows.start]..prefix[rows.end];
                if !range.is_empty() || rows.start == 0 {
                    out.push_table_run(*new_id, range);
                }
            }
        }
    }
    out
}

/// Per-residue confidence: the local QA metric when present, else mean atom B-factors.
pub fn residue_scores(doc: &StructureDocument) -> (ScoreSource, Vec<ResidueScore>) {
    if let Some(scores) = doc.table(QA_METRIC_LOCAL).and_then(qa_scores) {
        return (ScoreSource::QaMetric, scores);
    }
    match doc.table(ATOM_SITE).and_then(b_factor_scores) {
        Some(scores) => (ScoreSource::BFactor, scores),
        None => (ScoreSource::None, Vec::new()),
    }
}

fn qa_scores(table: &Table) -> Option<Vec<ResidueScore>> {
    let chain_col = table.chain_column()?;
    let value_col = table.column_index("metric_value")?;
    let seq_col = table.column_index("label_seq_id");
    let name_col = table.column_index("label_comp_id");

    let scores = (0..table.len())
        .filter_map(|row| {
            let score = table.value(row, value_col)?.parse::<f64>().ok()?;
            Some(ResidueScore {
                chain: table.value(row, chain_col)?.to_string(),
                residue: seq_col.and_then(|c| table.value(row, c)?.parse().ok()),
                name: name_col.and_then(|c| table.value(row, c)).map(str::to_string),
                score,
            })
        })
        .collect();
    Some(scores)
}

fn b_factor_scores(table: &Table) -> Option<Vec<ResidueScore>> {
    let chain_col = table.chain_column()?;
    let b_col = table.column_index("B_iso_or_equiv")?;
    let seq_col = table.first_column(table.schema()?.position_fields)?;
    let name_col = table.first_column(&["label_comp_id", "auth_comp_id"]);

    // (chain, position) -> index into `residues`, keeping first-seen order.
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut residues: Vec<(ResidueScore, f64, usize)> = Vec::new();

    for row in 0..table.len() {
        let record = &table.rows()[row];
        if record.class() != Some(RecordClass::Atom) || record.kind() != RecordKind::Position {
            continue;
        }
        let Some(b) = table.value(row, b_col).and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        let chain = table.value(row, chain_col).unwrap_or_default().to_string();
        let position = table.value(row, seq_col).unwrap_or_default().to_string();
        let slot = *index.entry((chain.clone(), position.clone())).or_insert_with(|| {
            residues.push((
                ResidueScore {
                    chain,
                    residue: position.parse().ok(),
                    name: name_col.and_then(|c| table.value(row, c)).map(str::to_string),
                    score: 0.0,
                },
                0.0,
                0,
            ));
            residues.len() - 1
        });
        let (_, sum, count) = &mut residues[slot];
        *sum += b;
        *count += 1;
    }

    Some(
        residues
            .into_iter()
            .map(|(mut score, sum, count)| {
                score.score = sum / count as f64;
                score
            })
            .collect(),
    )
}
