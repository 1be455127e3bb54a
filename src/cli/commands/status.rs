//! status command - Show the link, patch head and series state
//!
//! Read-only; takes no lock.

use super::Outcome;
use crate::core::error::PlyError;
use crate::engine::{Context, Workspace};
use crate::git::{GitCli, Vcs};
use crate::ui::output::Reporter;
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Snapshot of a linked working tree.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusReport {
    /// Working tree root.
    pub root: PathBuf,
    /// Linked patch repository.
    pub patch_repo: PathBuf,
    /// Current branch, if HEAD is not detached.
    pub branch: Option<String>,
    /// Last cleanly applied ordinal; `None` before the first apply.
    pub head: Option<u32>,
    /// Highest ordinal in the patch repository.
    pub max_ordinal: u32,
    /// Number of patch files.
    pub patches: usize,
    /// Ordinal waiting for `ply resolve`, if an apply is paused.
    pub blocked_at: Option<u32>,
}

/// Print the state of the working tree.
pub fn status(ctx: &Context, json: bool) -> Result<Outcome> {
    let ws = Workspace::discover(&ctx.cwd()?)?;
    let git = GitCli::open(ws.root()).context("failed to open working tree repository")?;

    let head = match ws.head.read() {
        Ok(ordinal) => Some(ordinal),
        Err(PlyError::NotLinked { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    let series = ws.series()?;
    let blocked_at = if git.apply_in_progress()? {
        head.and_then(|h| series.next_after(h)).map(|o| o.get())
    } else {
        None
    };

    let report = StatusReport {
        root: ws.root().to_path_buf(),
        patch_repo: ws.patch_repo().to_path_buf(),
        branch: git.current_branch()?.map(String::from),
        head: head.map(|h| h.get()),
        max_ordinal: series.max_ordinal().get(),
        patches: series.len(),
        blocked_at,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(Outcome::Complete);
    }

    let out = Reporter::new(ctx.quiet, ctx.debug);
    out.field("Working tree", report.root.display());
    out.field("Patch repo", report.patch_repo.display());
    out.field(
        "Branch",
        report.branch.as_deref().unwrap_or("(detached)"),
    );
    let head_text = report
        .head
        .map(|h| h.to_string())
        .unwrap_or_else(|| "(not applied)".to_string());
    out.field(
        "Patch head",
        format!("{} of {}", head_text, report.max_ordinal),
    );
    out.field("Patches", report.patches);
    if let Some(ordinal) = report.blocked_at {
        out.warn(format!(
            "patch {} is conflicted; run 'ply resolve' once fixed",
            ordinal
        ));
    }
    Ok(Outcome::Complete)
}
