//! Working tree status
//!
//! Classifies every path across the three states that matter: the working
//! tree, the index, and the HEAD tree.
//!
//! - `file_change`: change categories for the two comparisons
//! - `inspector`: per-entry change detection
//! - `status_info`: report assembly and formatting

pub mod file_change;
pub mod inspector;
pub mod status_info;
