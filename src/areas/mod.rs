//! Core repository components
//!
//! The building blocks a repository coordinates:
//!
//! - `database`: content-addressed object store
//! - `index`: staging area tracking the next commit's tree
//! - `refs`: reference management (HEAD, branches, remote-tracking refs)
//! - `remote`: smart-HTTP exchanges with a compatible remote
//! - `repository`: high-level operations and coordination
//! - `workspace`: working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod remote;
pub mod repository;
pub mod workspace;
