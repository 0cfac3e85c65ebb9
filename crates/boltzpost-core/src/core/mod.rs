//! # Core Module
//!
//! This module provides the data model and file I/O that every boltzpost operation builds on.
//!
//! ## Overview
//!
//! A structure file is held as a [`models::document::StructureDocument`]: the tables that
//! refer to residues are parsed into rows with value spans, and everything else is kept as
//! verbatim text in its original position. Writing a document that was not edited reproduces
//! its source exactly.
//!
//! ## Architecture
//!
//! - **Tabular Records** ([`models`]) - Documents, tables, rows, column layouts and the
//!   registry of tracked tables
//! - **File I/O** ([`io`]) - mmCIF and PDB readers, the writer, format detection, sample
//!   splitting and prediction response decoding

pub mod io;
pub mod models;
