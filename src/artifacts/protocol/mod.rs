//! Smart-HTTP v1 wire formats
//!
//! - `pkt_line`: the length-prefixed framing both exchanges use
//! - `remote_refs`: the ref advertisement returned by ref discovery

pub mod pkt_line;
pub mod remote_refs;

/// Capabilities sent with every `want` line
pub const CAPABILITIES: &str = "multi_ack ofs-delta thin-pack include-tag";

/// Service name for ref discovery and fetch
pub const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";

/// Service name for push
pub const RECEIVE_PACK_SERVICE: &str = "git-receive-pack";

/// `old` value announcing a ref that does not exist on the remote yet
pub const ZERO_OID: &str = "0000000000000000000000000000000000000000";
