//! apply command - Rebuild a branch from the whole patch series

use super::{sequence_outcome, Outcome};
use crate::core::types::BranchName;
use crate::engine::{Context, Workspace};
use crate::git::{CheckoutMode, GitCli};
use anyhow::{Context as _, Result};

/// Check out `branch` and apply every patch from the first.
pub fn apply(ctx: &Context, branch: &str, create: bool, reset: bool) -> Result<Outcome> {
    // Rejected before anything touches the repository.
    let mode = CheckoutMode::from_flags(create, reset)?;
    let branch = BranchName::new(branch)?;

    let ws = Workspace::discover(&ctx.cwd()?)?;
    let _lock = ws.lock()?;
    let git = GitCli::open(ws.root()).context("failed to open working tree repository")?;

    let report = ws.sequencer(&git).initialize(&branch, mode)?;
    Ok(sequence_outcome(ctx, &report))
}
