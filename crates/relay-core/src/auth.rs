//! # Identity Types
//!
//! Credentials, the identity provider trait, and the token result relayed
//! to callers.

use crate::error::UpstreamResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Service account credentials held by the server
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials only when both halves are present and non-empty.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw successful response from the identity endpoint.
///
/// Fields are optional because the upstream may omit them; the gate decides
/// what a usable response is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "Token", default)]
    pub token: Option<String>,

    #[serde(rename = "TokenExpiryUtc", default)]
    pub token_expiry_utc: Option<String>,
}

/// Token relayed to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub token: String,
    /// Expiry exactly as the identity service reported it
    pub expires_at_utc: Option<String>,
}

/// Narrow interface over the external identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a token. One outbound call, no retries.
    async fn authenticate(&self, credentials: &Credentials) -> UpstreamResult<AuthResponse>;

    /// Name used in logs
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared identity provider (dynamic dispatch)
pub type BoxedIdentityProvider = Arc<dyn IdentityProvider>;
