//! core
//!
//! Core domain types, persisted state and the patch series index.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Ordinal, BranchName
//! - [`naming`] - Patch and branch naming rules
//! - [`paths`] - Path routing and upward marker discovery
//! - [`series`] - Patch Repository Index
//! - [`head`] - Patch Head Tracker
//! - [`link`] - Linking a working tree to its patch repository
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Worktree locking
//! - [`error`] - Error taxonomy
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Persisted state is written atomically
//! - Nothing here talks to git; that is [`crate::git`]'s job

pub mod config;
pub mod error;
pub mod head;
pub mod link;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod series;
pub mod types;

pub use error::{ErrorKind, PlyError};
