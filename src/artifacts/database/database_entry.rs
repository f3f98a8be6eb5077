//! Database entry representation
//!
//! A `(oid, mode)` pair read out of a tree object. Used when traversing
//! trees during checkout, status, and reachability walks.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    /// Hash of the referenced object
    pub oid: ObjectId,
    /// Entry mode (file permissions and type)
    pub mode: EntryMode,
}

impl DatabaseEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}
