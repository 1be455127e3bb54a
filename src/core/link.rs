//! core::link
//!
//! Linking a working tree to its patch repository.
//!
//! `link` validates the given path, canonicalizes it (absolute, `~` and
//! symlinks expanded) and writes it to `R/.PATCH_REPO`. Every later
//! operation finds the patch repository through that pointer.
//!
//! Known gap: the target is not checked to be a git repository. A plain
//! directory links fine and only fails once the exporter tries to commit.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::PlyError;
use crate::core::paths::{absolutize, expand_home, locate_root, PlyPaths, PATCH_REPO_POINTER};

/// A resolved link: the working tree root and the patch repository it
/// points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Directory holding the pointer file.
    pub root: PathBuf,
    /// Canonical patch repository path.
    pub patch_repo: PathBuf,
}

/// Link the working tree at `root` to `patch_repo`.
///
/// Relative `patch_repo` paths are resolved against the process working
/// directory, as a shell user would expect.
///
/// # Errors
///
/// [`PlyError::PathNotFound`] if `patch_repo` does not exist. No pointer is
/// written in that case.
pub fn link(root: &Path, patch_repo: &Path) -> Result<Link, PlyError> {
    let expanded = absolutize(&expand_home(patch_repo));
    if !expanded.exists() {
        return Err(PlyError::PathNotFound { path: expanded });
    }
    let canonical = fs::canonicalize(&expanded).map_err(|e| PlyError::io(&expanded, e))?;

    let paths = PlyPaths::new(root);
    let pointer = paths.pointer_path();
    fs::write(&pointer, format!("{}\n", canonical.display()))
        .map_err(|e| PlyError::io(&pointer, e))?;
    paths
        .ensure_state_dir()
        .map_err(|e| PlyError::io(paths.state_dir(), e))?;

    info!(root = %root.display(), patch_repo = %canonical.display(), "linked patch repository");
    Ok(Link {
        root: root.to_path_buf(),
        patch_repo: canonical,
    })
}

/// Resolve the link governing `start` by walking upward to the pointer.
///
/// # Errors
///
/// - [`PlyError::NotLinked`] if no pointer exists up to the filesystem root
/// - [`PlyError::PathNotFound`] if the pointer is empty
pub fn resolve_link(start: &Path) -> Result<Link, PlyError> {
    let root = locate_root(PATCH_REPO_POINTER, start).ok_or_else(|| PlyError::NotLinked {
        marker: PATCH_REPO_POINTER.to_string(),
        start: absolutize(start),
    })?;

    let pointer = PlyPaths::new(&root).pointer_path();
    let content = fs::read_to_string(&pointer).map_err(|e| PlyError::io(&pointer, e))?;
    let target = content.trim();
    if target.is_empty() {
        return Err(PlyError::PathNotFound { path: pointer });
    }

    Ok(Link {
        root,
        patch_repo: PathBuf::from(target),
    })
}
