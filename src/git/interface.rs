//! git::interface
//!
//! [`GitCli`], the production [`Vcs`] adapter.
//!
//! # Architecture
//!
//! Reads (repository discovery, current branch, in-progress state) go
//! through `git2`. Mailbox application and patch generation have no libgit2
//! equivalent with `git am --3way` semantics, so those shell out to the
//! `git` binary with the adapter's directory as the child's working
//! directory.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::Spawn`]: The git binary could not be started
//! - [`GitError::CommandFailed`]: git exited non-zero for a reason other
//!   than a patch conflict
//! - [`GitError::ApplyInProgress`]: an earlier apply is still paused
//! - [`GitError::IncompatibleOptions`]: Caller asked for contradictory
//!   behavior; raised before anything runs
//!
//! # Example
//!
//! ```ignore
//! use ply::git::{GitCli, Vcs};
//! use std::path::Path;
//!
//! let git = GitCli::open(Path::new("."))?;
//! if let Some(branch) = git.current_branch()? {
//!     println!("on {}", branch);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::types::{BranchName, Ordinal, TypeError};

use super::adapter::{ApplyOutcome, CheckoutMode, CommitOptions, Vcs};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The git binary could not be started.
    #[error("failed to run git {command}: {source}")]
    Spawn {
        /// The subcommand being run
        command: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// git exited unsuccessfully.
    #[error("git {command} failed ({status}): {stderr}")]
    CommandFailed {
        /// The subcommand that failed
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// A patch application is already paused in this working tree.
    #[error("a patch application is already paused; run 'ply resolve' or 'git am --abort'")]
    ApplyInProgress,

    /// Mutually exclusive options were requested together.
    #[error("mutually incompatible options: {0}")]
    IncompatibleOptions(String),

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidRefName {
            message: err.to_string(),
        }
    }
}

/// [`Vcs`] implementation backed by git.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` may be any directory
    /// inside the working tree. The adapter is bound to the working tree
    /// root.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        Ok(Self {
            workdir: Self::discover(path)?,
        })
    }

    /// Bind to `dir` without discovery.
    ///
    /// Failures surface on first use.
    pub fn at_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: dir.into(),
        }
    }

    /// Working tree root of the repository containing `path`.
    pub fn discover(path: &Path) -> Result<PathBuf, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        Ok(repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf())
    }

    fn repo(&self) -> Result<git2::Repository, GitError> {
        git2::Repository::open(&self.workdir).map_err(|_| GitError::NotARepo {
            path: self.workdir.clone(),
        })
    }

    /// Whether the index holds unmerged entries, i.e. the tree has conflict
    /// markers waiting to be fixed.
    fn has_unmerged(&self) -> Result<bool, GitError> {
        Ok(self.repo()?.index()?.has_conflicts())
    }

    /// Drop a paused apply and restore the branch to where it started.
    fn abort_apply(&self) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(["am", "--abort"]);
        self.run(cmd, "am --abort").map(drop)
    }

    /// Stage modifications and deletions of tracked files (`git add -u`).
    ///
    /// Untracked files, including ply's own state, are left alone.
    pub fn stage_tracked(&self) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(["add", "-u"]);
        self.run(cmd, "add -u").map(drop)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.workdir);
        cmd
    }

    /// Run a prepared command, capturing output.
    fn output(&self, mut cmd: Command, name: &str) -> Result<Output, GitError> {
        debug!(command = name, dir = %self.workdir.display(), "running git");
        cmd.output().map_err(|source| GitError::Spawn {
            command: name.to_string(),
            source,
        })
    }

    /// Run a prepared command, failing on non-zero exit. Returns stdout.
    fn run(&self, cmd: Command, name: &str) -> Result<String, GitError> {
        let output = self.output(cmd, name)?;
        if !output.status.success() {
            return Err(failure(name, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn failure(name: &str, output: &Output) -> GitError {
    GitError::CommandFailed {
        command: name.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

impl Vcs for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn at(&self, dir: &Path) -> Box<dyn Vcs> {
        Box::new(GitCli::at_dir(dir))
    }

    fn checkout(&self, branch: &BranchName, mode: CheckoutMode) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.arg("checkout");
        match mode {
            CheckoutMode::Existing => {}
            CheckoutMode::Create => {
                cmd.arg("-b");
            }
            CheckoutMode::CreateOrReset => {
                cmd.arg("-B");
            }
        }
        cmd.arg(branch.as_str());
        self.run(cmd, "checkout").map(drop)
    }

    fn apply_patch(&self, patch: &Path, three_way: bool) -> Result<ApplyOutcome, GitError> {
        if self.apply_in_progress()? {
            return Err(GitError::ApplyInProgress);
        }

        let mut cmd = self.command();
        cmd.arg("am");
        if three_way {
            cmd.arg("--3way");
        }
        cmd.arg(patch);

        let output = self.output(cmd, "am")?;
        if output.status.success() {
            return Ok(ApplyOutcome::Clean);
        }

        let paused = self.apply_in_progress()?;
        if paused && self.has_unmerged()? {
            let mut detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                if !detail.is_empty() {
                    detail.push('\n');
                }
                detail.push_str(stderr.trim());
            }
            warn!(patch = %patch.display(), "patch did not apply cleanly");
            return Ok(ApplyOutcome::Conflict { detail });
        }

        // No markers to fix: the failure is fatal and the tree goes back to
        // its state before this patch so a retry starts clean.
        if paused {
            if let Err(e) = self.abort_apply() {
                warn!(error = %e, "could not abort failed apply");
            }
        }
        Err(failure("am", &output))
    }

    fn apply_in_progress(&self) -> Result<bool, GitError> {
        Ok(matches!(
            self.repo()?.state(),
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase
        ))
    }

    fn resolve_apply(&self) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(["am", "--resolved"]);
        self.run(cmd, "am --resolved").map(drop)
    }

    fn commit(&self, message: &str, options: &CommitOptions) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.arg("commit");
        if options.all {
            cmd.arg("-a");
        }
        if options.amend {
            cmd.arg("--amend");
        }
        match &options.reuse_message {
            Some(rev) => {
                cmd.args(["-C", rev.as_str()]);
            }
            None => {
                cmd.args(["-m", message]);
            }
        }
        self.run(cmd, "commit").map(drop)
    }

    fn format_patch(&self, count: usize, start: Ordinal) -> Result<Vec<PathBuf>, GitError> {
        let mut cmd = self.command();
        cmd.arg("format-patch")
            .arg(format!("-{}", count))
            .arg("--start-number")
            .arg(start.to_string());
        let stdout = self.run(cmd, "format-patch")?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.workdir.join(line))
            .collect())
    }

    fn add(&self, path: &Path) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(["add", "--"]).arg(path);
        self.run(cmd, "add").map(drop)
    }

    fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let repo = self.repo()?;
        let head = match repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                // Unborn HEAD still names a branch symbolically.
                let head_ref = repo.find_reference("HEAD")?;
                return match head_ref
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                {
                    Some(name) => Ok(Some(BranchName::new(name)?)),
                    None => Ok(None),
                };
            }
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_non_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            GitCli::open(dir.path()),
            Err(GitError::NotARepo { .. })
        ));
    }

    #[test]
    fn at_rebinds_directory() {
        let git = GitCli::at_dir("/work");
        let other = git.at(Path::new("/patches"));
        assert_eq!(other.workdir(), Path::new("/patches"));
    }
}
