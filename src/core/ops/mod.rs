//! core::ops
//!
//! Operation guards.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive advisory lock on a working tree
//!
//! # Architecture
//!
//! Every mutating command acquires the worktree lock before touching the
//! patch head or the working tree, and holds it until the command returns
//! (including when it stops on a conflict).

pub mod lock;

pub use lock::{LockError, WorktreeLock};
