//! Command implementations
//!
//! Organized into two layers, following the reference system's own
//! split:
//!
//! - `plumbing`: direct object and index inspection (cat-file, ls-tree,
//!   rev-parse, ...)
//! - `porcelain`: user-facing workflows (init, add, commit, status, ...)
//!
//! Commands attach to `Repository` so they share the stores and the
//! injected output writer.

pub mod plumbing;
pub mod porcelain;
