//! # Credential Gate
//!
//! Forwards the server-held service account to the identity provider and
//! translates the outcome for the caller.

use crate::auth::{AuthResult, BoxedIdentityProvider, Credentials};
use crate::error::{RelayError, RelayResult, UpstreamError};
use crate::translate::translate_identity_status;
use tracing::{error, info, instrument};

pub const MISSING_CREDENTIALS: &str = "Server configuration error: Missing API credentials";
pub const INVALID_AUTH_RESPONSE: &str = "Invalid authentication response from ResDiary API";
pub const UNREACHABLE: &str =
    "Unable to connect to ResDiary API. Please check network connectivity.";
pub const NETWORK_FAILURE: &str = "Network error during authentication";

/// Stateless login relay
#[derive(Clone)]
pub struct CredentialGate {
    provider: Option<BoxedIdentityProvider>,
    credentials: Option<Credentials>,
}

impl CredentialGate {
    /// `provider` is `None` when the identity service is not configured at all.
    pub fn new(provider: Option<BoxedIdentityProvider>, credentials: Option<Credentials>) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    /// Whether the service account is configured
    pub fn credentials_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Authenticate with the identity service. At most one outbound call.
    #[instrument(skip(self))]
    pub async fn login(&self) -> RelayResult<AuthResult> {
        info!(
            credentials_configured = self.credentials_configured(),
            "Starting backend login"
        );

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            error!("Missing identity credentials in configuration");
            RelayError::Configuration(MISSING_CREDENTIALS.to_string())
        })?;

        let provider = self.provider.as_ref().ok_or_else(|| {
            error!("Identity service base URL is not configured");
            RelayError::Configuration(MISSING_CREDENTIALS.to_string())
        })?;

        let response = provider
            .authenticate(credentials)
            .await
            .map_err(|e| translate_upstream_error(provider.provider_name(), e))?;

        info!(
            has_token = response.token.is_some(),
            has_expiry = response.token_expiry_utc.is_some(),
            "Authentication response received"
        );

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                error!("Identity response did not contain a token");
                RelayError::UpstreamProtocol(INVALID_AUTH_RESPONSE.to_string())
            })?;

        info!("Authenticated with {}", provider.provider_name());

        Ok(AuthResult {
            token,
            expires_at_utc: response.token_expiry_utc,
        })
    }
}

/// Translate an identity client failure into the caller-facing error
pub fn translate_upstream_error(provider: &str, err: UpstreamError) -> RelayError {
    error!(provider, error = %err, "Backend login failed");

    match err {
        UpstreamError::Status { status, message } => translate_identity_status(status, message),
        UpstreamError::Unreachable(_) => RelayError::ServiceUnavailable(UNREACHABLE.to_string()),
        UpstreamError::Transport(_) | UpstreamError::Decode(_) => {
            RelayError::Network(NETWORK_FAILURE.to_string())
        }
        // The identity API reports bad requests as HTTP 400
        UpstreamError::InvalidRequest(message) => {
            translate_identity_status(400, Some(message))
        }
    }
}
