//! cli
//!
//! Command-line interface layer for ply.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT talk to version control directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that resolve a [`crate::engine::Workspace`] and drive the
//! sequencer or exporter.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};
pub use commands::Outcome;

use crate::engine;
use anyhow::Result;

/// Run an already parsed command line.
///
/// `main.rs` parses first so logging can be configured from `--debug`
/// before anything runs.
pub fn run(cli: Cli) -> Result<Outcome> {
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
