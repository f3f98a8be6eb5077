pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of an object ID as lowercase hex
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an object ID as raw bytes (trees, packs, index)
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
