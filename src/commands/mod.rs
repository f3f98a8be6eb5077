//! Command implementations
//!
//! Organized the way git organizes its surface:
//!
//! - `plumbing`: direct object and index manipulation (cat-file,
//!   hash-object, ls-tree, write-tree, commit-tree, ls-files)
//! - `porcelain`: user-facing workflows (init, add, commit, status,
//!   branch, checkout, clone, push, pull)
//!
//! Each command is a method on `Repository` so the CLI driver stays a
//! thin argv-to-call mapping.

pub mod plumbing;
pub mod porcelain;
