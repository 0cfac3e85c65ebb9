use crate::core::models::document::Format;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response fields summarizing the confidence of each sample.
pub const CONFIDENCE_KEYS: [&str; 8] = [
    "confidence_scores",
    "ptm_scores",
    "iptm_scores",
    "complex_plddt_scores",
    "complex_iplddt_scores",
    "complex_pde_scores",
    "complex_ipde_scores",
    "chains_ptm_scores",
];

/// Response fields holding pairwise matrices.
pub const MATRIX_KEYS: [&str; 3] = ["pae", "pde", "pair_chains_iptm_scores"];

pub const AFFINITY_KEY: &str = "affinities";

/// One predicted structure embedded in a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
}

impl StructureEntry {
    /// The declared format, when it names one we read.
    pub fn declared_format(&self) -> Option<Format> {
        self.format.as_deref().and_then(|f| f.parse().ok())
    }
}

/// A structure prediction service response.
///
/// Only `structures` is interpreted on read; every other field is kept as JSON and
/// looked up by name when the artifacts are assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub structures: Vec<StructureEntry>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PredictionResponse {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Non-empty structure texts, with their declared formats.
    pub fn structure_texts(&self) -> impl Iterator<Item = (&str, Option<Format>)> {
        self.structures.iter().filter_map(|entry| {
            entry
                .structure
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| (s, entry.declared_format()))
        })
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Summary scores of one sample (0-based) out of `samples`.
    ///
    /// An array with one entry per sample contributes that sample's entry; any other
    /// value applies to every sample and is copied whole.
    pub fn summary_for(&self, index: usize, samples: usize) -> Map<String, Value> {
        CONFIDENCE_KEYS
            .iter()
            .filter_map(|&key| {
                let value = self.field(key)?;
                Some((key.to_string(), per_sample(value, index, samples).clone()))
            })
            .collect()
    }

    /// The affinity record, when present and non-empty.
    pub fn affinity(&self) -> Option<&Value> {
        self.field(AFFINITY_KEY).filter(|v| match v {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
    }
}

/// Picks the entry of a per-sample array, or the whole value when it is shared.
pub fn per_sample(value: &Value, index: usize, samples: usize) -> &Value {
    match value {
        Value::Array(items) if items.len() == samples => items.get(index).unwrap_or(value),
        _ => value,
    }
}
