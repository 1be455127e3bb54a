//! link command - Point this working tree at its patch repository

use super::Outcome;
use crate::core::config::{Config, PlyConfig};
use crate::core::link;
use crate::core::paths::expand_home;
use crate::engine::Context;
use crate::git::GitCli;
use crate::ui::output::Reporter;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Link the working tree containing the current directory.
///
/// The pointer lands at the git working tree root when there is one, else
/// in the current directory. A relative `path` is taken relative to the
/// current directory (honoring `--cwd`).
pub fn link(ctx: &Context, path: &Path, no_three_way: bool) -> Result<Outcome> {
    let out = Reporter::new(ctx.quiet, ctx.debug);
    let cwd = ctx.cwd()?;

    let root = match GitCli::discover(&cwd) {
        Ok(work_dir) => work_dir,
        Err(_) => {
            out.note("not inside a git working tree; linking here");
            cwd.clone()
        }
    };

    let target = expand_home(path);
    let target = if target.is_absolute() {
        target
    } else {
        cwd.join(target)
    };

    let linked = link::link(&root, &target)?;

    if no_three_way {
        let existing = Config::load(Some(&linked.root))?.worktree.unwrap_or_default();
        let updated = PlyConfig {
            three_way: Some(false),
            ..existing
        };
        let written = Config::write_worktree(&linked.root, &updated)
            .context("failed to record worktree configuration")?;
        out.note(format!("wrote {}", written.display()));
    }

    out.line(format!(
        "Linked {} to {}",
        linked.root.display(),
        linked.patch_repo.display()
    ));
    Ok(Outcome::Complete)
}
