//! Git data structures and codecs
//!
//! This module contains the core types and byte-level formats:
//!
//! - `branch`: Branch name validation and symbolic ref names
//! - `core`: Shared error kinds
//! - `database`: Database entry types
//! - `index`: Index/staging area binary format
//! - `objects`: Git object types (blob, tree, commit)
//! - `pack`: Packfile codec (read, write, delta reconstruction)
//! - `protocol`: Smart-HTTP wire framing (pkt-line, ref advertisements)
//! - `status`: Working tree status classification

pub mod branch;
pub mod core;
pub mod database;
pub mod index;
pub mod objects;
pub mod pack;
pub mod protocol;
pub mod status;
