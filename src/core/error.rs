//! core::error
//!
//! Error taxonomy for patch-stack operations.
//!
//! # Categories
//!
//! - **Configuration**: the caller pointed ply at something that is not
//!   there ([`PlyError::NotLinked`], [`PlyError::PathNotFound`],
//!   [`PlyError::MalformedPatchName`], ...). Never retryable as-is.
//! - **Usage**: mutually incompatible options, or asking to resolve when
//!   nothing is blocked.
//! - **Fatal**: version-control or filesystem failures. The patch head is
//!   left at its last good value, so rerunning from the top is safe.
//!
//! A conflict while applying a patch is deliberately absent here. It is a
//! normal sequencer state, not an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::ops::LockError;
use crate::core::types::Ordinal;
use crate::git::GitError;

/// Broad classification of a [`PlyError`], used to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed setup; fix the configuration and retry.
    Configuration,
    /// The request itself cannot be satisfied as given.
    Usage,
    /// Version control or I/O failed underneath us.
    Fatal,
}

/// Errors from patch-stack operations.
#[derive(Debug, Error)]
pub enum PlyError {
    /// No marker file was found between the start directory and the root.
    #[error("not linked to a patch repository: no {marker} found from {start} up to the filesystem root (run 'ply link <path>')")]
    NotLinked {
        /// The marker that was searched for.
        marker: String,
        /// Where the upward search started.
        start: PathBuf,
    },

    /// A path the caller named does not exist.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A patch file or branch name does not start with a numeric ordinal.
    #[error("malformed patch name '{name}': expected '<ordinal>-<description>'")]
    MalformedPatchName {
        /// The offending name.
        name: String,
    },

    /// Two patch files in one series carry the same ordinal.
    #[error("duplicate ordinal {ordinal} in patch repository: {} and {}", first.display(), second.display())]
    DuplicateOrdinal {
        /// The shared ordinal.
        ordinal: Ordinal,
        /// First file carrying it.
        first: PathBuf,
        /// Second file carrying it.
        second: PathBuf,
    },

    /// The head marker exists but does not hold a decimal ordinal.
    #[error("corrupt patch head at {path}: {content:?}")]
    CorruptHead {
        /// Marker file path.
        path: PathBuf,
        /// What was found there.
        content: String,
    },

    /// `resolve` was requested but no patch application is in progress.
    #[error("nothing to resolve: no patch application is in progress")]
    NothingToResolve,

    /// The exporter did not leave a patch for the resolved ordinal.
    #[error("patch {ordinal} was not regenerated in the patch repository; refusing to skip it")]
    MissingExport {
        /// The ordinal that should have been written.
        ordinal: Ordinal,
    },

    /// Filesystem failure on a specific path.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl PlyError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlyError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlyError::NotLinked { .. }
            | PlyError::PathNotFound { .. }
            | PlyError::MalformedPatchName { .. }
            | PlyError::DuplicateOrdinal { .. }
            | PlyError::CorruptHead { .. }
            | PlyError::Config(_) => ErrorKind::Configuration,
            PlyError::NothingToResolve | PlyError::Lock(LockError::AlreadyLocked) => {
                ErrorKind::Usage
            }
            PlyError::Git(GitError::IncompatibleOptions(_) | GitError::ApplyInProgress) => {
                ErrorKind::Usage
            }
            PlyError::MissingExport { .. }
            | PlyError::Io { .. }
            | PlyError::Git(_)
            | PlyError::Lock(_) => ErrorKind::Fatal,
        }
    }
}
