//! core::series
//!
//! Patch Repository Index: the ordered view of the patch files in a
//! directory.
//!
//! # Naming
//!
//! A patch is any regular file ending in `.patch`. Its ordinal is the
//! numeric prefix before the first `-`. Anything else in the directory
//! (a README, the `.git` directory) is ignored.
//!
//! # Invariants
//!
//! - Entries are sorted by ordinal ascending, independent of the order the
//!   filesystem lists them in.
//! - No two entries share an ordinal. A directory that violates this is
//!   reported as [`PlyError::DuplicateOrdinal`] instead of picking one.
//! - Gaps are tolerated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::PlyError;
use crate::core::naming::ordinal_prefix;
use crate::core::types::Ordinal;

/// File suffix of patch files.
pub const PATCH_SUFFIX: &str = ".patch";

/// One patch file in the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    /// Parsed ordinal prefix.
    pub ordinal: Ordinal,
    /// Absolute path to the file.
    pub path: PathBuf,
}

impl PatchEntry {
    /// The file name, e.g. `0002-add-logging.patch`.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// The ordered patch series of a patch repository.
#[derive(Debug, Clone, Default)]
pub struct PatchSeries {
    entries: Vec<PatchEntry>,
}

impl PatchSeries {
    /// Index the patch files in `dir`.
    ///
    /// # Errors
    ///
    /// - [`PlyError::PathNotFound`] if `dir` does not exist
    /// - [`PlyError::MalformedPatchName`] if a `.patch` file has no ordinal
    /// - [`PlyError::DuplicateOrdinal`] if two files share an ordinal
    pub fn scan(dir: &Path) -> Result<Self, PlyError> {
        if !dir.is_dir() {
            return Err(PlyError::PathNotFound {
                path: dir.to_path_buf(),
            });
        }

        let listing = fs::read_dir(dir).map_err(|e| PlyError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|e| PlyError::io(dir, e))?;
            let path = entry.path();
            if path.is_file() && is_patch_file(&path) {
                paths.push(path);
            }
        }

        Self::from_paths(paths)
    }

    /// Build a series from an arbitrary listing of patch file paths.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self, PlyError> {
        let mut entries = paths
            .into_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ordinal_prefix(&name).map(|ordinal| PatchEntry { ordinal, path })
            })
            .collect::<Result<Vec<_>, _>>()?;

        entries.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.path.cmp(&b.path)));

        if let Some(pair) = entries.windows(2).find(|w| w[0].ordinal == w[1].ordinal) {
            return Err(PlyError::DuplicateOrdinal {
                ordinal: pair[0].ordinal,
                first: pair[0].path.clone(),
                second: pair[1].path.clone(),
            });
        }

        Ok(Self { entries })
    }

    /// The largest ordinal, or zero for an empty series.
    pub fn max_ordinal(&self) -> Ordinal {
        self.entries
            .last()
            .map_or(Ordinal::ZERO, |entry| entry.ordinal)
    }

    /// All entries in ascending ordinal order.
    ///
    /// Each call starts a fresh iteration.
    pub fn iter(&self) -> impl Iterator<Item = &PatchEntry> + '_ {
        self.entries.iter()
    }

    /// Entries with ordinal `>= start`, ascending.
    pub fn from_ordinal(&self, start: Ordinal) -> impl Iterator<Item = &PatchEntry> + '_ {
        let first = self.entries.partition_point(|entry| entry.ordinal < start);
        self.entries[first..].iter()
    }

    /// The first ordinal strictly above `head`, skipping gaps.
    ///
    /// This is the patch a run resuming after `head` applies next, and the
    /// one a paused apply is blocked on.
    pub fn next_after(&self, head: Ordinal) -> Option<Ordinal> {
        self.from_ordinal(head.next()).next().map(|entry| entry.ordinal)
    }

    /// Look up the entry for an ordinal.
    pub fn get(&self, ordinal: Ordinal) -> Option<&PatchEntry> {
        self.entries
            .binary_search_by(|entry| entry.ordinal.cmp(&ordinal))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the series has no patches.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a path names a patch file.
pub fn is_patch_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(PATCH_SUFFIX) && n.len() > PATCH_SUFFIX.len())
}
