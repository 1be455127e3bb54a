//! ply - keep a numbered patch series applied on top of an upstream tree
//!
//! A maintainer keeps local changes as a linear series of patch files
//! (`0001-fix-build.patch`, `0002-...`) in a separate patch repository.
//! ply applies the series onto a branch of the upstream working tree in
//! ordinal order, stops on a conflict, regenerates the conflicting patch
//! from the resolved commit, and carries on.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Patch Sequencer, Patch Exporter and workspace discovery
//! - [`core`] - Domain types, patch series index, head tracker, config, errors
//! - [`git`] - Single interface for all version-control operations
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. The patch head is persisted after every clean application and never
//!    moves backwards except on explicit re-initialization
//! 2. Application resumes strictly after the persisted head
//! 3. A conflict is a state to resolve, never an error to retry
//! 4. A patch series never holds two files with the same ordinal

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
