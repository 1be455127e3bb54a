//! git::adapter
//!
//! The version-control capability the sequencer and exporter consume.
//!
//! # Design
//!
//! [`Vcs`] is bound to one repository directory. Operations that belong to
//! a different repository (the patch repository) go through an adapter
//! obtained with [`Vcs::at`], so no process-wide working directory is ever
//! changed and nothing needs restoring when an operation fails halfway.
//!
//! Every call blocks until git reports a definitive outcome. Applying a
//! patch has three outcomes: [`ApplyOutcome::Clean`],
//! [`ApplyOutcome::Conflict`], or `Err(GitError)` for anything fatal.

use std::path::{Path, PathBuf};

use crate::core::types::{BranchName, Ordinal};

use super::interface::GitError;

/// How to switch to the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Check out an existing branch.
    Existing,
    /// Create the branch (`git checkout -b`).
    Create,
    /// Create the branch, resetting it if it exists (`git checkout -B`).
    CreateOrReset,
}

impl CheckoutMode {
    /// Build a mode from the two independent CLI-style flags.
    ///
    /// # Errors
    ///
    /// [`GitError::IncompatibleOptions`] when both flags are set. This is
    /// checked before any process is started.
    ///
    /// # Example
    ///
    /// ```
    /// use ply::git::CheckoutMode;
    ///
    /// assert_eq!(CheckoutMode::from_flags(false, false).unwrap(), CheckoutMode::Existing);
    /// assert_eq!(CheckoutMode::from_flags(true, false).unwrap(), CheckoutMode::Create);
    /// assert!(CheckoutMode::from_flags(true, true).is_err());
    /// ```
    pub fn from_flags(create: bool, create_and_reset: bool) -> Result<Self, GitError> {
        match (create, create_and_reset) {
            (true, true) => Err(GitError::IncompatibleOptions(
                "create and create_and_reset".to_string(),
            )),
            (true, false) => Ok(CheckoutMode::Create),
            (false, true) => Ok(CheckoutMode::CreateOrReset),
            (false, false) => Ok(CheckoutMode::Existing),
        }
    }
}

/// Options for [`Vcs::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Stage all modified tracked files (`-a`).
    pub all: bool,
    /// Amend the current HEAD commit (`--amend`).
    pub amend: bool,
    /// Reuse message and authorship of this revision (`-C <rev>`) instead
    /// of the given message.
    pub reuse_message: Option<String>,
}

/// Result of applying one patch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The patch applied and was committed.
    Clean,
    /// The patch left merge markers; the application is paused.
    Conflict {
        /// What git reported.
        detail: String,
    },
}

/// Version-control operations used by ply.
pub trait Vcs {
    /// Directory this adapter operates in.
    fn workdir(&self) -> &Path;

    /// An adapter for the repository at `dir`.
    fn at(&self, dir: &Path) -> Box<dyn Vcs>;

    /// Switch to `branch`.
    fn checkout(&self, branch: &BranchName, mode: CheckoutMode) -> Result<(), GitError>;

    /// Apply a mailbox patch and commit it.
    ///
    /// Fails with [`GitError::ApplyInProgress`] when an earlier apply is
    /// still paused. A failure that leaves no conflict markers is fatal.
    fn apply_patch(&self, patch: &Path, three_way: bool) -> Result<ApplyOutcome, GitError>;

    /// Whether a patch application is paused awaiting resolution.
    fn apply_in_progress(&self) -> Result<bool, GitError>;

    /// Complete a paused patch application after the conflict was fixed and
    /// staged.
    fn resolve_apply(&self) -> Result<(), GitError>;

    /// Create a commit.
    fn commit(&self, message: &str, options: &CommitOptions) -> Result<(), GitError>;

    /// Write the last `count` commits as patch files numbered from `start`,
    /// returning their paths in order.
    fn format_patch(&self, count: usize, start: Ordinal) -> Result<Vec<PathBuf>, GitError>;

    /// Stage a path (including its deletion).
    fn add(&self, path: &Path) -> Result<(), GitError>;

    /// Short name of the checked-out branch, `None` when detached.
    fn current_branch(&self) -> Result<Option<BranchName>, GitError>;
}
