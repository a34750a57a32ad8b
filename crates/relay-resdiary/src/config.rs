//! # ResDiary Configuration
//!
//! Connection settings for the ResDiary identity endpoint. The service
//! account itself lives in [`relay_core::Credentials`], not here.

use std::time::Duration;

/// Path of the JWT authentication endpoint, relative to the base URL
pub const AUTHENTICATE_PATH: &str = "/api/Jwt/v2/Authenticate";

/// Default bound on the outbound call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// ResDiary API configuration
#[derive(Debug, Clone)]
pub struct ResDiaryConfig {
    /// API base URL, e.g. `https://api.resdiary.com`
    pub api_base_url: String,

    /// Timeout for the whole authentication call
    pub timeout: Duration,

    /// Skip TLS certificate verification (off unless explicitly enabled)
    pub accept_invalid_certs: bool,
}

impl ResDiaryConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Full URL of the authentication endpoint
    pub fn authenticate_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base_url.trim_end_matches('/'),
            AUTHENTICATE_PATH
        )
    }

    /// Builder: set the outbound timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: relax TLS verification
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}
