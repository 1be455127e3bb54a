//! save command - Export the current commit as this branch's patch

use super::Outcome;
use crate::core::naming::ordinal_prefix;
use crate::engine::{Context, Workspace};
use crate::git::{CommitOptions, GitCli, Vcs};
use crate::ui::output::Reporter;
use anyhow::{anyhow, Context as _, Result};

/// Export the last commit at the ordinal named by the current branch.
///
/// With `amend`, the last commit is first amended in place, keeping its
/// message and authorship; `all` also stages modified tracked files.
pub fn save(ctx: &Context, amend: bool, all: bool) -> Result<Outcome> {
    let out = Reporter::new(ctx.quiet, ctx.debug);
    let ws = Workspace::discover(&ctx.cwd()?)?;
    let _lock = ws.lock()?;
    let git = GitCli::open(ws.root()).context("failed to open working tree repository")?;

    let branch = git
        .current_branch()?
        .ok_or_else(|| anyhow!("HEAD is detached; check out a patch branch first"))?;
    let ordinal = ordinal_prefix(branch.as_str())?;

    if amend {
        let options = CommitOptions {
            all,
            amend: true,
            reuse_message: Some("HEAD".to_string()),
        };
        git.commit("", &options).context("failed to amend last commit")?;
    }

    let written = ws.exporter(&git).export(1, ordinal)?;
    for name in &written {
        out.line(format!("Saved {}", name));
    }
    Ok(Outcome::Complete)
}
