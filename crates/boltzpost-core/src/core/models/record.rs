use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a coordinate row, decoded once from its explicit marker.
///
/// Polymer records (`ATOM`, and PDB `TER` terminators) are [`RecordClass::Atom`];
/// ligands, waters and ions (`HETATM`) are [`RecordClass::Heteroatom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordClass {
    Atom,
    Heteroatom,
}

/// What a coordinate-table row describes, decoded from the same marker as its class.
///
/// mmCIF `atom_site` rows are always positions; PDB files interleave anisotropic
/// temperature factors (`ANISOU`) and chain terminators (`TER`) with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    #[default]
    Position,
    Anisotropic,
    Terminator,
}

impl RecordKind {
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim() {
            "ANISOU" => RecordKind::Anisotropic,
            "TER" => RecordKind::Terminator,
            _ => RecordKind::Position,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown record class marker '{0}'")]
pub struct ParseRecordClassError(pub String);

impl FromStr for RecordClass {
    type Err = ParseRecordClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ATOM" | "TER" => Ok(RecordClass::Atom),
            "HETATM" => Ok(RecordClass::Heteroatom),
            other => Err(ParseRecordClassError(other.to_string())),
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordClass::Atom => "ATOM",
                RecordClass::Heteroatom => "HETATM",
            }
        )
    }
}
