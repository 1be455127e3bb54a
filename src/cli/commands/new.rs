//! new command - Create a branch for the next patch on top of the series

use super::{sequence_outcome, Outcome};
use crate::core::naming::patch_branch_name;
use crate::engine::{Context, Workspace};
use crate::git::{CheckoutMode, GitCli};
use crate::ui::output::Reporter;
use anyhow::{Context as _, Result};

/// Create `<next ordinal>-<slug(name)>` and apply the whole series onto it.
pub fn new(ctx: &Context, name: &str) -> Result<Outcome> {
    let out = Reporter::new(ctx.quiet, ctx.debug);
    let ws = Workspace::discover(&ctx.cwd()?)?;
    let _lock = ws.lock()?;
    let git = GitCli::open(ws.root()).context("failed to open working tree repository")?;

    let next = ws.series()?.max_ordinal().next();
    let branch = patch_branch_name(next, name)?;
    out.line(format!("Creating branch {}", branch));

    let report = ws
        .sequencer(&git)
        .initialize(&branch, CheckoutMode::Create)?;
    let outcome = sequence_outcome(ctx, &report);
    if outcome == Outcome::Complete {
        out.line(format!("Commit your change on {} and run 'ply save'", branch));
    }
    Ok(outcome)
}
