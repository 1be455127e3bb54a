//! core::head
//!
//! Patch Head Tracker: persists the ordinal of the last patch cleanly
//! applied to a working tree.
//!
//! # Storage
//!
//! `R/.ply/PATCH_HEAD` holds the decimal ordinal and a trailing newline.
//! Writes go to a sibling temp file which is then renamed over the marker,
//! so a reader never observes a partially written value.
//!
//! # Discovery
//!
//! The marker is found by walking upward from a start directory (see
//! [`locate_root`]). Reading a head that does not exist is
//! [`PlyError::NotLinked`], never a silent zero.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::PlyError;
use crate::core::paths::{absolutize, locate_root, PlyPaths, HEAD_MARKER};
use crate::core::types::Ordinal;

/// Reads and writes the patch head marker of one working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadTracker {
    path: PathBuf,
    start: PathBuf,
}

impl HeadTracker {
    /// Tracker for the marker under a known root.
    pub fn at(root: &Path) -> Self {
        let path = PlyPaths::new(root).head_path();
        Self {
            start: root.to_path_buf(),
            path,
        }
    }

    /// Find an existing marker from `start` upward.
    ///
    /// # Errors
    ///
    /// [`PlyError::NotLinked`] if no marker exists up to the filesystem root.
    pub fn find(start: &Path) -> Result<Self, PlyError> {
        let root = locate_root(HEAD_MARKER, start).ok_or_else(|| PlyError::NotLinked {
            marker: HEAD_MARKER.to_string(),
            start: absolutize(start),
        })?;
        Ok(Self::at(&root))
    }

    /// Find an existing marker from `start` upward, falling back to
    /// `fallback_root` when none exists yet.
    ///
    /// The fallback is where a first [`write`](Self::write) initializes it.
    pub fn discover(start: &Path, fallback_root: &Path) -> Self {
        match locate_root(HEAD_MARKER, start) {
            Some(root) => Self::at(&root),
            None => Self {
                path: PlyPaths::new(fallback_root).head_path(),
                start: absolutize(start),
            },
        }
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the marker currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the persisted head.
    ///
    /// # Errors
    ///
    /// - [`PlyError::NotLinked`] if the marker does not exist
    /// - [`PlyError::CorruptHead`] if it does not hold a decimal ordinal
    pub fn read(&self) -> Result<Ordinal, PlyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlyError::NotLinked {
                    marker: HEAD_MARKER.to_string(),
                    start: self.start.clone(),
                })
            }
            Err(e) => return Err(PlyError::io(&self.path, e)),
        };

        content
            .trim()
            .parse::<Ordinal>()
            .map_err(|_| PlyError::CorruptHead {
                path: self.path.clone(),
                content,
            })
    }

    /// Overwrite the persisted head.
    pub fn write(&self, ordinal: Ordinal) -> Result<(), PlyError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| PlyError::io(dir, e))?;

        let temp_path = self.path.with_extension("tmp");
        let write_temp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            writeln!(file, "{}", ordinal)?;
            file.sync_all()
        };
        write_temp().map_err(|e| PlyError::io(&temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| PlyError::io(&self.path, e))?;
        debug!(head = %ordinal, path = %self.path.display(), "patch head written");
        Ok(())
    }

    /// Reset the head to zero (new branch initialization).
    pub fn reset(&self) -> Result<(), PlyError> {
        self.write(Ordinal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let tracker = HeadTracker::at(temp.path());
        tracker.write(Ordinal::new(3)).unwrap();
        assert_eq!(tracker.read().unwrap(), Ordinal::new(3));
    }

    #[test]
    fn marker_format_is_decimal_newline() {
        let temp = TempDir::new().unwrap();
        let tracker = HeadTracker::at(temp.path());
        tracker.write(Ordinal::new(12)).unwrap();
        assert_eq!(fs::read_to_string(tracker.path()).unwrap(), "12\n");
        assert!(!tracker.path().with_extension("tmp").exists());
    }

    #[test]
    fn read_without_marker_is_not_linked() {
        let temp = TempDir::new().unwrap();
        let err = HeadTracker::find(temp.path()).unwrap_err();
        assert!(matches!(err, PlyError::NotLinked { .. }));

        let err = HeadTracker::discover(temp.path(), temp.path())
            .read()
            .unwrap_err();
        assert!(matches!(err, PlyError::NotLinked { .. }));
    }

    #[test]
    fn find_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        HeadTracker::at(temp.path()).write(Ordinal::new(2)).unwrap();
        let sub = temp.path().join("a/b/c");
        fs::create_dir_all(&sub).unwrap();

        let tracker = HeadTracker::find(&sub).unwrap();
        assert_eq!(tracker.read().unwrap(), Ordinal::new(2));
    }

    #[test]
    fn discover_falls_back_for_initialization() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir_all(&sub).unwrap();

        let tracker = HeadTracker::discover(&sub, temp.path());
        assert!(!tracker.exists());
        tracker.reset().unwrap();
        assert_eq!(tracker.path(), PlyPaths::new(temp.path()).head_path());
        assert_eq!(HeadTracker::find(&sub).unwrap().read().unwrap(), Ordinal::ZERO);
    }

    #[test]
    fn garbage_is_corrupt_not_zero() {
        let temp = TempDir::new().unwrap();
        let tracker = HeadTracker::at(temp.path());
        tracker.write(Ordinal::ZERO).unwrap();
        fs::write(tracker.path(), "three\n").unwrap();
        assert!(matches!(
            tracker.read().unwrap_err(),
            PlyError::CorruptHead { .. }
        ));
    }
}
