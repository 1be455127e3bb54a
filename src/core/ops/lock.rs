//! core::ops::lock
//!
//! Advisory lock serializing mutating ply commands on one working tree.
//!
//! # Architecture
//!
//! The sequencer itself assumes exclusive access to the working tree and
//! its patch head. Concurrent invocations are the caller's responsibility,
//! and the CLI discharges it by holding this lock around every command that
//! applies, resolves or exports patches.
//!
//! # Storage
//!
//! - `R/.ply/lock` - lock file with an OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)
//!
//! # Example
//!
//! ```ignore
//! use ply::core::ops::lock::WorktreeLock;
//! use ply::core::paths::PlyPaths;
//!
//! let paths = PlyPaths::new("/work/tree");
//! let lock = WorktreeLock::acquire(&paths)?;
//! // ... apply patches ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::core::paths::PlyPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("working tree is locked by another ply process")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on a working tree's ply state.
///
/// Released when dropped.
#[derive(Debug)]
pub struct WorktreeLock {
    file: File,
}

impl WorktreeLock {
    /// Attempt to acquire the lock.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &PlyPaths) -> Result<Self, LockError> {
        let state_dir = paths.state_dir();
        fs::create_dir_all(&state_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", state_dir.display(), e))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "worktree lock acquired");
                Ok(Self { file })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }
}

impl Drop for WorktreeLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
