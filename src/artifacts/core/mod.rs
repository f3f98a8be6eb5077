//! Shared error taxonomy
//!
//! Every failure the core can produce falls into one of a small set of
//! kinds. Codecs and stores construct these values and let them bubble up
//! through `anyhow` so callers keep the context chain; the CLI driver
//! prints the chain and exits nonzero.

use thiserror::Error;

/// Failure kinds distinguished by the core.
///
/// - `NotFound` is a signal for some callers (status, ref reads) and an
///   error for others; APIs that expect absence return `Option` instead.
/// - `Corrupt` aborts the current operation before durable state mutates.
/// - `Unsupported` carries the offending value for diagnostics.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("corrupt {0}")]
    Corrupt(String),

    #[error("unsupported {0}")]
    Unsupported(String),

    #[error("{0}")]
    Conflict(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication failure: {0}")]
    Auth(String),
}

impl GitError {
    /// Missing credentials share one message pointing the user at token
    /// creation.
    pub fn missing_credentials(var: &str) -> Self {
        GitError::Auth(format!(
            "{var} environment variable not set; create a personal access token \
             and export GIT_USERNAME and GIT_TOKEN"
        ))
    }
}
