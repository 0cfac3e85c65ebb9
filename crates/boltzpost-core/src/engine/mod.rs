//! # Engine Module
//!
//! This module implements the document transformations of boltzpost: residue renumbering
//! and splitting a prediction into per-sample artifacts.
//!
//! ## Overview
//!
//! The engine works on parsed [`StructureDocument`](crate::core::models::document::StructureDocument)s
//! and never touches the file system. Every operation either completes or leaves its input
//! unchanged, so callers can retry or report errors without cleaning up partial edits.
//!
//! ## Architecture
//!
//! - **Renumbering** ([`renumber`]) - Offset computation and the consistent rewrite of residue
//!   positions across every table that refers to them
//! - **Splitting** ([`split`]) - Sample separation, protein-only filtering, confidence scores,
//!   pairwise matrices and affinity records
//! - **Progress Monitoring** ([`progress`]) - Progress events for callers with a user interface

pub mod progress;
pub mod renumber;
pub mod split;
