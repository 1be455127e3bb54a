//! ui::output
//!
//! What ply tells the maintainer.
//!
//! # Design
//!
//! Commands report through a [`Reporter`] built from the global `--quiet`
//! and `--debug` flags. Progress and results go to stdout; warnings, errors
//! and debug notes go to stderr. A blocked patch is always reported, even
//! in quiet mode, because the exit code alone does not say which patch to
//! fix. Machine-readable output (`status --json`) bypasses this module.
//!
//! Message text is built by plain functions so it can be checked without
//! capturing the process streams.

use std::fmt::Display;
use std::path::Path;

use crate::core::types::Ordinal;

/// Width of the label column in `ply status`.
const LABEL_WIDTH: usize = 14;

/// How much to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only errors and blocked patches.
    Quiet,
    Normal,
    /// Also debug notes and git's own conflict report.
    Debug,
}

impl Verbosity {
    /// Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Prints command output at a fixed verbosity.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    verbosity: Verbosity,
}

impl Reporter {
    pub fn new(quiet: bool, debug: bool) -> Self {
        Self {
            verbosity: Verbosity::from_flags(quiet, debug),
        }
    }

    /// A line of normal output.
    pub fn line(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            println!("{}", message);
        }
    }

    /// A note shown only with `--debug`.
    pub fn note(&self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            eprintln!("[debug] {}", message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            eprintln!("warning: {}", message);
        }
    }

    /// One `Label:  value` row of a status table.
    pub fn field(&self, label: &str, value: impl Display) {
        self.line(field(label, value));
    }

    pub fn applied(&self, ordinal: Ordinal) {
        self.line(format!("Applied {}", ordinal.padded()));
    }

    pub fn regenerated(&self, ordinal: Ordinal) {
        self.line(format!("Regenerated patch {}", ordinal.padded()));
    }

    pub fn head(&self, ordinal: Ordinal) {
        self.line(format!("Patch head at {}", ordinal));
    }

    /// Report a patch that stopped on a conflict, with the next step.
    pub fn blocked(&self, ordinal: Ordinal, patch: &Path, detail: &str) {
        error(blocked_message(ordinal, patch));
        if !detail.is_empty() {
            self.note(detail);
        }
        if self.verbosity != Verbosity::Quiet {
            eprintln!("{}", RESOLVE_HINT);
        }
    }
}

/// What to do once a patch is blocked.
pub const RESOLVE_HINT: &str =
    "hint: fix the conflict markers, stage the result and run 'ply resolve'";

/// Print an error message. Always shown.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

fn blocked_message(ordinal: Ordinal, patch: &Path) -> String {
    format!("patch {} conflicted: {}", ordinal.padded(), patch.display())
}

fn field(label: &str, value: impl Display) -> String {
    format!("{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn blocked_message_names_padded_ordinal_and_file() {
        let msg = blocked_message(Ordinal::new(3), Path::new("/p/0003-fix.patch"));
        assert_eq!(msg, "patch 0003 conflicted: /p/0003-fix.patch");
        assert!(RESOLVE_HINT.contains("ply resolve"));
    }

    #[test]
    fn fields_line_up() {
        assert_eq!(field("Branch", "main"), "Branch:        main");
        assert_eq!(field("Working tree", "/w"), "Working tree:  /w");
    }
}
