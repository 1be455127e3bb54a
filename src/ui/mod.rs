//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Command handlers report through this module so quiet and debug modes
//! behave the same everywhere. Diagnostic logging from the engine goes
//! through `tracing` instead.

pub mod output;
