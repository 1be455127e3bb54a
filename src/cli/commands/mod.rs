//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves the workspace from the context's working directory
//! 2. Takes the worktree lock if it mutates state
//! 3. Calls the engine and reports through [`crate::ui::output`]
//!
//! Handlers return an [`Outcome`]. A patch that stopped on a conflict is a
//! normal outcome, not an error; the binary maps it to its own exit code.

mod apply;
mod completion;
mod link;
mod new;
mod resolve;
mod save;
mod status;

// Re-export command functions for testing and direct invocation
pub use apply::apply;
pub use completion::completion;
pub use link::link;
pub use new::new;
pub use resolve::resolve;
pub use save::save;
pub use status::{status, StatusReport};

use crate::cli::args::Command;
use crate::core::types::Ordinal;
use crate::engine::{Context, SequenceReport};
use crate::ui::output::Reporter;
use anyhow::Result;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything requested was done.
    Complete,
    /// A patch conflicted; the maintainer must fix it and run `ply resolve`.
    NeedsResolution {
        /// The conflicting ordinal.
        ordinal: Ordinal,
    },
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<Outcome> {
    match command {
        Command::Link { path, no_three_way } => link(ctx, &path, no_three_way),
        Command::New { name } => new(ctx, &name),
        Command::Apply {
            branch,
            create,
            reset,
        } => apply(ctx, &branch, create, reset),
        Command::Resolve { all } => resolve(ctx, all),
        Command::Save { amend, all } => save(ctx, amend, all),
        Command::Status { json } => status(ctx, json),
        Command::Completion { shell } => completion(shell),
    }
}

/// Report a sequencing run and turn it into an [`Outcome`].
fn sequence_outcome(ctx: &Context, report: &SequenceReport) -> Outcome {
    let out = Reporter::new(ctx.quiet, ctx.debug);

    if let Some(ordinal) = report.resolved {
        out.regenerated(ordinal);
    }
    for ordinal in &report.applied {
        out.applied(*ordinal);
    }

    match &report.conflict {
        Some(conflict) => {
            out.blocked(conflict.ordinal, &conflict.patch, &conflict.detail);
            Outcome::NeedsResolution {
                ordinal: conflict.ordinal,
            }
        }
        None => {
            out.head(report.head);
            Outcome::Complete
        }
    }
}
