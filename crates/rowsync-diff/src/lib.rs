#![forbid(unsafe_code)]

//! Identity-based diff over ordered key sequences.
//!
//! [`diff`] compares an old and a new sequence of keys and returns the
//! minimal partition into [`DiffRun`]s of [`DiffOp::Equal`],
//! [`DiffOp::Insert`] and [`DiffOp::Delete`]. Keys are compared with
//! `PartialEq` only; nothing else about an element is inspected.
//!
//! # Role in rowsync
//! `rowsync-diff` is the pure leaf of the workspace. `rowsync-core` feeds it
//! group keys and item identifiers and turns the runs into index-accurate
//! structural edits.

pub mod lcs;
pub mod run;

pub use lcs::diff;
pub use run::{DiffOp, DiffRun, DiffStats, apply, is_identity};
