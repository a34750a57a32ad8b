//! # Upstream Status Translation
//!
//! Maps identity-service HTTP statuses to caller-facing statuses and
//! messages. Every status maps to itself except 500, which becomes 502.

use crate::error::RelayError;

/// Fallback message for unmapped statuses without an upstream message
pub const DEFAULT_AUTH_FAILURE: &str = "Authentication failed with ResDiary API";

/// Fixed translations, keyed by upstream status
const IDENTITY_STATUS_TABLE: &[(u16, u16, &str)] = &[
    (400, 400, "Invalid credentials provided to ResDiary API"),
    (401, 401, DEFAULT_AUTH_FAILURE),
    (403, 403, "Access denied by ResDiary API"),
    (404, 404, "ResDiary API endpoint not found"),
    (500, 502, "ResDiary API server error"),
];

/// Translate an identity-service error status into a [`RelayError`].
///
/// Mapped statuses use their fixed message; anything else passes the status
/// through and prefers the upstream's own `message`.
pub fn translate_identity_status(upstream: u16, upstream_message: Option<String>) -> RelayError {
    match IDENTITY_STATUS_TABLE
        .iter()
        .find(|(from, _, _)| *from == upstream)
    {
        Some((_, to, message)) => RelayError::UpstreamStatus {
            status: *to,
            message: (*message).to_string(),
        },
        None => RelayError::UpstreamStatus {
            status: upstream,
            message: upstream_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_AUTH_FAILURE.to_string()),
        },
    }
}
