//! # ResDiary Identity Client
//!
//! One JSON POST per login. Classifies every outcome into an
//! [`UpstreamError`] so the Credential Gate can translate it.

use crate::config::ResDiaryConfig;
use async_trait::async_trait;
use relay_core::{AuthResponse, Credentials, IdentityProvider, UpstreamError, UpstreamResult};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// ResDiary identity provider
pub struct ResDiaryClient {
    config: ResDiaryConfig,
    client: Client,
}

impl ResDiaryClient {
    /// Create a new client; fails only if the TLS backend cannot initialize.
    pub fn new(config: ResDiaryConfig) -> reqwest::Result<Self> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the ResDiary API");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ResDiaryConfig {
        &self.config
    }
}

#[async_trait]
impl IdentityProvider for ResDiaryClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn authenticate(&self, credentials: &Credentials) -> UpstreamResult<AuthResponse> {
        let url = self.config.authenticate_url();
        debug!("Making ResDiary authentication request to {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        debug!(status = status.as_u16(), "ResDiary authentication response received");

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        // A success body that is not the expected JSON carries no token; the
        // gate reports that as a protocol error.
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!("Unparseable ResDiary authentication body: {}", e);
            AuthResponse::default()
        }))
    }

    fn provider_name(&self) -> &'static str {
        "resdiary"
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}

/// Connection-level failures mean the host is unreachable; anything else
/// (timeouts, TLS, truncated bodies) is a generic transport error.
fn classify_transport_error(err: &reqwest::Error) -> UpstreamError {
    if err.is_connect() && !err.is_timeout() {
        UpstreamError::Unreachable(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}
