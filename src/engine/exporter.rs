//! engine::exporter
//!
//! Patch Exporter: turns the most recent commits of the working tree into
//! patch files and records them in the patch repository.
//!
//! # Flow
//!
//! 1. `format_patch` in the working tree, numbered from the start ordinal
//! 2. Check every produced name and find older files carrying one of the
//!    same ordinals under a different slug
//! 3. Move every produced file into the patch repository, replacing a file
//!    of the same name
//! 4. Drop the superseded files, so the series never holds a duplicate
//! 5. Stage and commit inside the patch repository, once
//!
//! A malformed generated name aborts before the patch repository is
//! touched. A failed move or removal aborts before anything is committed:
//! files already moved stay in the patch repository's working tree,
//! uncommitted, and `git status` there lists them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::schema::ORDINAL_PLACEHOLDER;
use crate::core::config::DEFAULT_EXPORT_MESSAGE;
use crate::core::error::PlyError;
use crate::core::naming::ordinal_prefix;
use crate::core::series::PatchSeries;
use crate::core::types::Ordinal;
use crate::git::{CommitOptions, Vcs};

/// Exports commits from the working tree into the patch repository.
pub struct Exporter<'a> {
    vcs: &'a dyn Vcs,
    patch_repo: PathBuf,
    message_template: String,
}

impl<'a> Exporter<'a> {
    /// Exporter writing into `patch_repo`, using `vcs` for the working tree.
    pub fn new(vcs: &'a dyn Vcs, patch_repo: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            patch_repo: patch_repo.into(),
            message_template: DEFAULT_EXPORT_MESSAGE.to_string(),
        }
    }

    /// Use a different commit message template (`{ordinal}` is substituted).
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Export the last `count` commits numbered from `start`.
    ///
    /// Returns the file names written into the patch repository.
    ///
    /// # Errors
    ///
    /// - [`PlyError::PathNotFound`] if the patch repository is gone
    /// - [`PlyError::Io`] if a file cannot be moved (nothing is committed)
    /// - [`PlyError::Git`] if generation, staging or committing fails
    pub fn export(&self, count: usize, start: Ordinal) -> Result<Vec<String>, PlyError> {
        if !self.patch_repo.is_dir() {
            return Err(PlyError::PathNotFound {
                path: self.patch_repo.clone(),
            });
        }

        let existing = PatchSeries::scan(&self.patch_repo)?;
        let generated = self.vcs.format_patch(count, start)?;
        debug!(count = generated.len(), start = %start, "generated patch files");

        let mut planned = Vec::with_capacity(generated.len());
        let mut stale = Vec::new();
        for source in &generated {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| PlyError::MalformedPatchName {
                    name: source.display().to_string(),
                })?;
            let ordinal = ordinal_prefix(&name)?;
            if let Some(old) = existing.get(ordinal) {
                if old.file_name() != name {
                    stale.push(old.path.clone());
                }
            }
            planned.push((source, name));
        }

        let mut moved = Vec::with_capacity(planned.len());
        for (source, name) in planned {
            move_file(source, &self.patch_repo.join(&name))?;
            moved.push(name);
        }

        for old in &stale {
            fs::remove_file(old).map_err(|e| PlyError::io(old, e))?;
            debug!(path = %old.display(), "removed superseded patch");
        }

        let repo = self.vcs.at(&self.patch_repo);
        for name in &moved {
            repo.add(Path::new(name))?;
        }
        for old in &stale {
            if let Some(name) = old.file_name() {
                repo.add(Path::new(name))?;
            }
        }
        repo.commit(&self.message(start), &CommitOptions::default())?;

        info!(ordinal = %start, files = ?moved, "exported to patch repository");
        Ok(moved)
    }

    fn message(&self, ordinal: Ordinal) -> String {
        self.message_template
            .replace(ORDINAL_PLACEHOLDER, &ordinal.to_string())
    }
}

/// Move a file, falling back to copy + remove across filesystems.
fn move_file(source: &Path, dest: &Path) -> Result<(), PlyError> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest).map_err(|e| PlyError::io(dest, e))?;
    fs::remove_file(source).map_err(|e| PlyError::io(source, e))
}
