//! Provides input/output functionality for structure file formats.
//!
//! This module reads mmCIF and PDB text into [`StructureDocument`]s that remember every
//! byte of their source, writes them back, and decodes the JSON responses of structure
//! prediction services. Multi-sample inputs are split into per-sample texts here, before
//! any parsing happens.

pub mod detect;
pub mod error;
pub mod mmcif;
pub mod pdb;
pub mod response;
pub mod samples;
pub mod tokenizer;
pub mod traits;
pub mod writer;

use crate::core::models::document::{Format, StructureDocument};
use error::ParseError;
use mmcif::MmcifFile;
use pdb::PdbFile;
use std::path::Path;
use traits::StructureFile;

/// Parses structure text in the given format.
pub fn parse(text: &str, format: Format) -> Result<StructureDocument, ParseError> {
    match format {
        Format::Mmcif => MmcifFile::parse(text),
        Format::Pdb => PdbFile::parse(text),
    }
}

/// Reads a single-document structure file, detecting its format.
///
/// Files holding several data blocks fail with [`ParseError::DuplicateTable`]; split them
/// with [`samples::split_samples`] first.
pub fn read_structure_path<P: AsRef<Path>>(path: P) -> Result<StructureDocument, ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = std::str::from_utf8(&bytes)?;
    parse(text, detect::detect_format(text, Some(path)))
}
