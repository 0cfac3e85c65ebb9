//! # Workflows Module
//!
//! This module provides the file-level entry points of boltzpost: each workflow reads its
//! input from disk, runs the engine, and writes the results next to the input or into a
//! chosen directory.
//!
//! ## Overview
//!
//! Workflows are what the command-line tool calls. They own path handling, format detection
//! and output naming, and attach the offending path to every error, so that a batch of files
//! can be processed independently and failures reported per file.
//!
//! ## Architecture
//!
//! - **Renumbering Workflow** ([`renumber`]) - Renumbers every data block of a structure file
//!   and writes a `_renumbered` copy
//! - **Splitting Workflow** ([`split`]) - Turns a structure file or prediction response into
//!   per-sample structure, confidence, matrix and affinity files
//! - **Error Handling** ([`error`]) - [`error::WorkflowError`], wrapping engine and I/O errors
//!   with the file they concern

pub mod error;
pub mod renumber;
pub mod split;
