//! # boltzpost Core Library
//!
//! Post-processing for the structure files produced by biomolecular structure prediction:
//! residue renumbering and splitting predictions into per-sample artifacts, without
//! disturbing a single byte the operation does not own.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** The tabular-record model (`StructureDocument`, `Table`,
//!   `Row`), the registry of tracked tables, and format-preserving mmCIF and PDB readers and
//!   writers.
//!
//! - **[`engine`]: The Logic Core.** Document transformations: the residue renumbering engine
//!   and the artifact splitter. Both work on in-memory documents and leave their input
//!   untouched on failure.
//!
//! - **[`workflows`]: The Public API.** File-level procedures that tie `core` and `engine`
//!   together: read, transform, and write with conventional output names.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
mod testing;
