//! resolve command - Finish a conflicting patch and continue the series

use super::{sequence_outcome, Outcome};
use crate::engine::{Context, Workspace};
use crate::git::GitCli;
use anyhow::{Context as _, Result};

/// Complete the paused apply, regenerate its patch and continue.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `all` - Stage all tracked changes before continuing
pub fn resolve(ctx: &Context, all: bool) -> Result<Outcome> {
    let ws = Workspace::discover(&ctx.cwd()?)?;
    let _lock = ws.lock()?;
    let git = GitCli::open(ws.root()).context("failed to open working tree repository")?;

    if all {
        git.stage_tracked()
            .context("failed to stage working tree changes")?;
    }

    let exporter = ws.exporter(&git);
    let report = ws.sequencer(&git).resolve(&exporter)?;
    Ok(sequence_outcome(ctx, &report))
}
