//! # Core Models Module
//!
//! This module contains the tabular-record model used to hold a structure file in memory
//! without losing any of its formatting.
//!
//! ## Overview
//!
//! A structure file is represented as a [`document::StructureDocument`]: an ordered list of
//! segments that are either verbatim text or runs of rows from a tracked [`table::Table`].
//! Each row keeps its source line and the byte span of every value, so that:
//!
//! - **Unmodified documents round-trip exactly** - every byte is emitted from where it was read
//! - **Edits stay local** - only the rewritten value and its padding change
//! - **Record classes are explicit** - coordinate rows carry a [`record::RecordClass`] decoded once
//!   from their marker field
//!
//! ## Key Components
//!
//! - [`document`] - The root container and the [`document::Format`] it was read from
//! - [`table`] - Named tables with their columns, header text and column layouts
//! - [`row`] - Rows with value spans and format-preserving value replacement
//! - [`column`] - Column layout and alignment detection
//! - [`record`] - Atom versus heteroatom classification
//! - [`schema`] - Registry of tracked tables and their residue-position fields
//! - [`ids`] - Stable identifiers for tables
//!
//! ## Usage
//!
//! ```ignore
//! use boltzpost::core::io::mmcif::MmcifFile;
//! use boltzpost::core::io::traits::StructureFile;
//!
//! let doc = MmcifFile::read_from_path("model.mmcif")?;
//! let atoms = doc.table("atom_site").unwrap();
//! println!("{} coordinate rows", atoms.len());
//! ```

pub mod column;
pub mod document;
pub mod ids;
pub mod record;
pub mod row;
pub mod schema;
pub mod table;
