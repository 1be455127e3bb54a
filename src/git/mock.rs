//! git::mock
//!
//! Mock VCS implementation for deterministic testing.
//!
//! # Design
//!
//! `MockVcs` implements [`Vcs`] in memory. Patch application outcomes are
//! scripted per ordinal (parsed from the patch file name), every call is
//! recorded together with the directory it was made in, and
//! `format_patch` writes real files so the exporter has something to move.
//! Adapters obtained through [`Vcs::at`] share the same state and log.
//!
//! # Example
//!
//! ```
//! use ply::core::types::Ordinal;
//! use ply::git::mock::MockVcs;
//! use ply::git::{ApplyOutcome, Vcs};
//! use std::path::Path;
//!
//! let vcs = MockVcs::new("/work");
//! vcs.conflict_on(Ordinal::new(2));
//!
//! let first = vcs.apply_patch(Path::new("/p/0001-a.patch"), true).unwrap();
//! assert_eq!(first, ApplyOutcome::Clean);
//!
//! let second = vcs.apply_patch(Path::new("/p/0002-b.patch"), true).unwrap();
//! assert!(matches!(second, ApplyOutcome::Conflict { .. }));
//! assert!(vcs.apply_in_progress().unwrap());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::naming::{ordinal_prefix, patch_file_name};
use crate::core::types::{BranchName, Ordinal};

use super::adapter::{ApplyOutcome, CheckoutMode, CommitOptions, Vcs};
use super::interface::GitError;

/// Mock VCS for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockVcs {
    dir: PathBuf,
    inner: Arc<Mutex<MockVcsInner>>,
}

#[derive(Debug)]
struct MockVcsInner {
    /// Ordinals whose next application conflicts.
    conflicts: HashSet<Ordinal>,
    /// Ordinals whose application fails fatally.
    fatal: HashSet<Ordinal>,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Patch whose application is paused.
    paused: Option<PathBuf>,
    branch: Option<BranchName>,
    /// Subject of the commits `format_patch` exports.
    subject: String,
    operations: Vec<MockOperation>,
}

/// Which non-apply operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Checkout,
    ResolveApply,
    Commit,
    FormatPatch,
    Add,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Checkout {
        branch: BranchName,
        mode: CheckoutMode,
    },
    Apply {
        patch: PathBuf,
        three_way: bool,
    },
    ResolveApply,
    Commit {
        dir: PathBuf,
        message: String,
        options: CommitOptions,
    },
    FormatPatch {
        dir: PathBuf,
        count: usize,
        start: Ordinal,
    },
    Add {
        dir: PathBuf,
        path: PathBuf,
    },
}

impl MockVcs {
    /// Create a mock bound to `dir` with nothing scripted.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            inner: Arc::new(Mutex::new(MockVcsInner {
                conflicts: HashSet::new(),
                fatal: HashSet::new(),
                fail_on: None,
                paused: None,
                branch: None,
                subject: "mock change".to_string(),
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockVcsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The next application of `ordinal` conflicts.
    pub fn conflict_on(&self, ordinal: Ordinal) {
        self.lock().conflicts.insert(ordinal);
    }

    /// Every application of `ordinal` fails fatally.
    pub fn fatal_on(&self, ordinal: Ordinal) {
        self.lock().fatal.insert(ordinal);
    }

    /// Make an operation fail.
    pub fn fail_on(&self, op: FailOn) {
        self.lock().fail_on = Some(op);
    }

    /// Stop failing operations.
    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// Set the current branch.
    pub fn set_branch(&self, branch: BranchName) {
        self.lock().branch = Some(branch);
    }

    /// Set the subject of exported commits.
    pub fn set_subject(&self, subject: impl Into<String>) {
        self.lock().subject = subject.into();
    }

    /// All recorded operations, in order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Patches passed to `apply_patch`, in order.
    pub fn applied_patches(&self) -> Vec<PathBuf> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Apply { patch, .. } => Some(patch.clone()),
                _ => None,
            })
            .collect()
    }

    /// Commit messages recorded in `dir`.
    pub fn commits_in(&self, dir: &Path) -> Vec<String> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Commit { dir: d, message, .. } if d == dir => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, op: FailOn, command: &str) -> Result<(), GitError> {
        if self.lock().fail_on == Some(op) {
            return Err(GitError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 128".to_string(),
                stderr: format!("mock failure in {command}"),
            });
        }
        Ok(())
    }
}

impl Vcs for MockVcs {
    fn workdir(&self) -> &Path {
        &self.dir
    }

    fn at(&self, dir: &Path) -> Box<dyn Vcs> {
        Box::new(MockVcs {
            dir: dir.to_path_buf(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn checkout(&self, branch: &BranchName, mode: CheckoutMode) -> Result<(), GitError> {
        self.record(MockOperation::Checkout {
            branch: branch.clone(),
            mode,
        });
        self.check_fail(FailOn::Checkout, "checkout")?;
        self.lock().branch = Some(branch.clone());
        Ok(())
    }

    fn apply_patch(&self, patch: &Path, three_way: bool) -> Result<ApplyOutcome, GitError> {
        self.record(MockOperation::Apply {
            patch: patch.to_path_buf(),
            three_way,
        });

        let name = patch
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ordinal = ordinal_prefix(&name).ok();

        let mut inner = self.lock();
        if inner.paused.is_some() {
            return Err(GitError::ApplyInProgress);
        }
        if let Some(ord) = ordinal {
            if inner.fatal.contains(&ord) {
                return Err(GitError::CommandFailed {
                    command: "am".to_string(),
                    status: "exit status: 128".to_string(),
                    stderr: format!("corrupt patch {name}"),
                });
            }
            if inner.conflicts.remove(&ord) {
                inner.paused = Some(patch.to_path_buf());
                return Ok(ApplyOutcome::Conflict {
                    detail: format!("CONFLICT (content): merge conflict applying {name}"),
                });
            }
        }
        Ok(ApplyOutcome::Clean)
    }

    fn apply_in_progress(&self) -> Result<bool, GitError> {
        Ok(self.lock().paused.is_some())
    }

    fn resolve_apply(&self) -> Result<(), GitError> {
        self.record(MockOperation::ResolveApply);
        self.check_fail(FailOn::ResolveApply, "am --resolved")?;
        if self.lock().paused.take().is_none() {
            return Err(GitError::CommandFailed {
                command: "am --resolved".to_string(),
                status: "exit status: 128".to_string(),
                stderr: "no am in progress".to_string(),
            });
        }
        Ok(())
    }

    fn commit(&self, message: &str, options: &CommitOptions) -> Result<(), GitError> {
        self.record(MockOperation::Commit {
            dir: self.dir.clone(),
            message: message.to_string(),
            options: options.clone(),
        });
        self.check_fail(FailOn::Commit, "commit")
    }

    fn format_patch(&self, count: usize, start: Ordinal) -> Result<Vec<PathBuf>, GitError> {
        self.record(MockOperation::FormatPatch {
            dir: self.dir.clone(),
            count,
            start,
        });
        self.check_fail(FailOn::FormatPatch, "format-patch")?;

        let subject = self.lock().subject.clone();
        let mut ordinal = start;
        let mut written = Vec::with_capacity(count);
        for idx in 0..count {
            let this_subject = if idx == 0 {
                subject.clone()
            } else {
                format!("{subject} {idx}")
            };
            let path = self.dir.join(patch_file_name(ordinal, &this_subject));
            let body = format!("From mock\nSubject: [PATCH] {this_subject}\n\n---\n");
            fs::write(&path, body).map_err(|source| GitError::Spawn {
                command: "format-patch".to_string(),
                source,
            })?;
            written.push(path);
            ordinal = ordinal.next();
        }
        Ok(written)
    }

    fn add(&self, path: &Path) -> Result<(), GitError> {
        self.record(MockOperation::Add {
            dir: self.dir.clone(),
            path: path.to_path_buf(),
        });
        self.check_fail(FailOn::Add, "add")
    }

    fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        Ok(self.lock().branch.clone())
    }
}
