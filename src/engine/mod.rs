//! engine
//!
//! Orchestrates patch-stack operations for one working tree.
//!
//! # Architecture
//!
//! A command resolves a [`Workspace`] (link pointer, head marker, merged
//! configuration), takes the worktree lock if it mutates anything, and then
//! drives one of the two engines:
//!
//! - [`sequencer::Sequencer`] applies the patch series and resolves
//!   conflicts
//! - [`exporter::Exporter`] writes commits back into the patch repository
//!
//! Both talk to version control only through [`crate::git::Vcs`].
//!
//! # Example
//!
//! ```ignore
//! use ply::engine::Workspace;
//! use ply::core::types::Ordinal;
//! use ply::git::GitCli;
//!
//! let ws = Workspace::discover(&std::env::current_dir()?)?;
//! let _lock = ws.lock()?;
//! let git = GitCli::open(ws.root())?;
//! let report = ws.sequencer(&git).apply_from(Ordinal::FIRST)?;
//! if let Some(conflict) = report.conflict {
//!     println!("blocked at {}", conflict.ordinal);
//! }
//! ```

pub mod exporter;
pub mod sequencer;

pub use exporter::Exporter;
pub use sequencer::{Conflict, SequenceReport, Sequencer, SequencerState};

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::error::PlyError;
use crate::core::head::HeadTracker;
use crate::core::link::{resolve_link, Link};
use crate::core::ops::WorktreeLock;
use crate::core::paths::PlyPaths;
use crate::core::series::PatchSeries;
use crate::git::Vcs;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Directory the command runs in: the `--cwd` override, else the
    /// process working directory.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("cannot determine current directory"),
        }
    }
}

/// A linked working tree and everything ply keeps for it.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Pointer to the patch repository.
    pub link: Link,
    /// State file locations under the working tree root.
    pub paths: PlyPaths,
    /// Patch head marker.
    pub head: HeadTracker,
    /// Merged global and worktree configuration.
    pub config: Config,
}

impl Workspace {
    /// Resolve the workspace governing `start`.
    ///
    /// # Errors
    ///
    /// - [`PlyError::NotLinked`] if no `.PATCH_REPO` exists above `start`
    /// - [`PlyError::Config`] if a config file is unreadable or invalid
    pub fn discover(start: &Path) -> Result<Self, PlyError> {
        let link = resolve_link(start)?;
        let paths = PlyPaths::new(&link.root);
        let head = HeadTracker::discover(start, &link.root);
        let config = Config::load(Some(&link.root))?;
        Ok(Self {
            link,
            paths,
            head,
            config,
        })
    }

    /// Working tree root (the directory holding `.PATCH_REPO`).
    pub fn root(&self) -> &Path {
        &self.link.root
    }

    /// Linked patch repository.
    pub fn patch_repo(&self) -> &Path {
        &self.link.patch_repo
    }

    /// Scan the patch repository.
    pub fn series(&self) -> Result<PatchSeries, PlyError> {
        PatchSeries::scan(self.patch_repo())
    }

    /// Take the worktree lock for a mutating operation.
    pub fn lock(&self) -> Result<WorktreeLock, PlyError> {
        Ok(WorktreeLock::acquire(&self.paths)?)
    }

    /// Exporter into this workspace's patch repository.
    pub fn exporter<'a>(&'a self, vcs: &'a dyn Vcs) -> Exporter<'a> {
        Exporter::new(vcs, self.patch_repo())
            .with_message_template(self.config.export_message_template())
    }

    /// Sequencer for this workspace, honoring the `three_way` setting.
    pub fn sequencer<'a>(&'a self, vcs: &'a dyn Vcs) -> Sequencer<'a> {
        Sequencer::new(vcs, &self.head, self.patch_repo()).with_three_way(self.config.three_way())
    }
}
