//! Common utilities for the richtext layout engine.
//!
//! This crate provides shared infrastructure used by the markup and layout crates:
//! - **Warning System** - colored, deduplicated terminal output for content that
//!   was degraded instead of rejected (lenient validation)

pub mod warning;

pub use warning::{clear_warnings, warn_once};
