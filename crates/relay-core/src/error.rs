//! # Relay Error Types
//!
//! Two layers of errors flow through booking-relay:
//!
//! - [`UpstreamError`] is what an upstream client reports: an HTTP status it
//!   received, a host it could not reach, or a transport failure.
//! - [`RelayError`] is the caller-facing outcome, carrying the HTTP status
//!   and message the front door returns.
//!
//! The Credential Gate and Purchase Verifier translate the former into the
//! latter; nothing else does.

use thiserror::Error;

/// Caller-facing error for every relay operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Server-held secrets are missing
    #[error("{0}")]
    Configuration(String),

    /// Bad caller input, detected before any outbound call
    #[error("{0}")]
    Validation(String),

    /// Upstream answered successfully but the payload was unusable
    #[error("{0}")]
    UpstreamProtocol(String),

    /// Upstream answered with an error status, already translated
    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },

    /// Upstream host could not be reached (connection refused, DNS)
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Any other transport failure (timeout, TLS, truncated body)
    #[error("{0}")]
    Network(String),

    /// Anything not translated locally; reported as an opaque 500
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Configuration(_) => 500,
            RelayError::Validation(_) => 400,
            RelayError::UpstreamProtocol(_) => 401,
            RelayError::UpstreamStatus { status, .. } => *status,
            RelayError::ServiceUnavailable(_) => 503,
            RelayError::Network(_) => 500,
            RelayError::Internal(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Internal errors never leak their details.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// True for errors that fall through to the generic handler
    pub fn is_internal(&self) -> bool {
        matches!(self, RelayError::Internal(_))
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Failure reported by an upstream client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Upstream responded with a non-success HTTP status
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("<no message>"))]
    Status {
        status: u16,
        /// Human-readable message extracted from the error body, if any
        message: Option<String>,
    },

    /// Upstream rejected the request as malformed (e.g. unknown object id)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection refused or host name did not resolve
    #[error("Unreachable: {0}")]
    Unreachable(String),

    /// Timeout, TLS failure, or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type alias for upstream client calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;
