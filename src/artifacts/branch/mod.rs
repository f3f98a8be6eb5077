//! Branch and reference names
//!
//! - Branch names follow git's refname rules (no leading dots, no `..`,
//!   no control characters, no `.lock` suffix, ...)
//! - Symbolic ref names are `.git`-relative paths like `HEAD` or
//!   `refs/heads/master`

pub mod branch_name;

/// Regex matching anything a branch name must not contain
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
