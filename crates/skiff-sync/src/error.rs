//! Error taxonomy for the synchronization engine.
//!
//! Failures are classified at the HTTP boundary: transport errors (the
//! request never completed), non-success statuses (with the server's own
//! error text when it sent one), and payload decode failures. All of them are
//! recoverable — the poll loop and the log tail degrade and continue.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenience alias for engine results.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure surfaced by the daemon client or one of the engine loops.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The endpoint path could not be joined onto the base URL.
    #[error("invalid URL for {endpoint}: {source}")]
    InvalidUrl {
        /// Endpoint being addressed.
        endpoint: String,
        /// Underlying parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The request failed before a response was received.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint being addressed.
        endpoint: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        /// Endpoint being addressed.
        endpoint: String,
        /// HTTP status code of the response.
        status: StatusCode,
        /// Server-provided error text, or a generic status description.
        message: String,
    },

    /// The response body could not be decoded into the expected schema.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        /// Endpoint being addressed.
        endpoint: String,
        /// Underlying reqwest/serde failure.
        #[source]
        source: reqwest::Error,
    },
}

impl SyncError {
    /// Returns the HTTP status when the failure was a non-success response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
