//! core::paths
//!
//! Centralized path routing for ply state.
//!
//! # Storage Layout
//!
//! Everything lives under the working tree root `R`, the directory that
//! holds the patch repository pointer:
//! - `R/.PATCH_REPO` - absolute path of the linked patch repository
//! - `R/.ply/PATCH_HEAD` - ordinal of the last cleanly applied patch
//! - `R/.ply/lock` - advisory lock held by mutating commands
//! - `R/.ply/config.toml` - optional worktree configuration
//!
//! State is found from any subdirectory with [`locate_root`], which walks
//! toward the filesystem root looking for a marker.
//!
//! # Example
//!
//! ```
//! use ply::core::paths::PlyPaths;
//! use std::path::PathBuf;
//!
//! let paths = PlyPaths::new("/work/tree");
//! assert_eq!(paths.head_path(), PathBuf::from("/work/tree/.ply/PATCH_HEAD"));
//! assert_eq!(paths.pointer_path(), PathBuf::from("/work/tree/.PATCH_REPO"));
//! ```

use std::path::{Path, PathBuf};

/// File holding the linked patch repository path, relative to the root.
pub const PATCH_REPO_POINTER: &str = ".PATCH_REPO";

/// Directory holding ply state, relative to the root.
pub const STATE_DIR: &str = ".ply";

/// Head marker, relative to the root.
pub const HEAD_MARKER: &str = ".ply/PATCH_HEAD";

/// Find the nearest ancestor of `start` (inclusive) that contains `marker`.
///
/// `marker` may be a relative path such as `.ply/PATCH_HEAD`. A relative
/// `start` is resolved against the process working directory. The walk
/// stops at the filesystem root, where a path's parent is itself.
///
/// # Example
///
/// ```
/// use ply::core::paths::locate_root;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join(".PATCH_REPO"), "/p\n").unwrap();
/// let nested = dir.path().join("a/b");
/// std::fs::create_dir_all(&nested).unwrap();
///
/// assert_eq!(locate_root(".PATCH_REPO", &nested).as_deref(), Some(dir.path()));
/// assert_eq!(locate_root("no-such-marker", &nested), None);
/// ```
pub fn locate_root(marker: impl AsRef<Path>, start: &Path) -> Option<PathBuf> {
    let marker = marker.as_ref();
    let start = absolutize(start);

    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}

/// Make a path absolute without touching the filesystem beyond the cwd.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Path routing for one working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyPaths {
    /// The working tree root.
    pub root: PathBuf,
}

impl PlyPaths {
    /// Create paths rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `R/.ply`
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// `R/.ply/PATCH_HEAD`
    pub fn head_path(&self) -> PathBuf {
        self.root.join(HEAD_MARKER)
    }

    /// `R/.ply/lock`
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir().join("lock")
    }

    /// `R/.ply/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join("config.toml")
    }

    /// `R/.PATCH_REPO`
    pub fn pointer_path(&self) -> PathBuf {
        self.root.join(PATCH_REPO_POINTER)
    }

    /// Ensure `R/.ply` exists.
    pub fn ensure_state_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.state_dir())
    }
}
