//! git
//!
//! Single interface for all version-control operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. The sequencer and exporter
//! see nothing but the [`Vcs`] trait, which lets them run against
//! [`mock::MockVcs`] in tests and [`GitCli`] in production. No other module
//! imports `git2` or spawns `git`.
//!
//! # Responsibilities
//!
//! - Branch checkout (existing, create, create-or-reset)
//! - Mailbox application with optional three-way merge, and its resolution
//! - Commits, staging, and patch generation
//! - Current branch and in-progress state detection
//!
//! # Example
//!
//! ```ignore
//! use ply::git::{GitCli, Vcs, ApplyOutcome};
//! use std::path::Path;
//!
//! let git = GitCli::open(Path::new("."))?;
//! match git.apply_patch(Path::new("/patches/0001-fix.patch"), true)? {
//!     ApplyOutcome::Clean => println!("applied"),
//!     ApplyOutcome::Conflict { detail } => println!("conflict:\n{}", detail),
//! }
//! ```

mod adapter;
mod interface;
pub mod mock;

pub use adapter::{ApplyOutcome, CheckoutMode, CommitOptions, Vcs};
pub use interface::{GitCli, GitError};
