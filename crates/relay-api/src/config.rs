//! # Application Configuration
//!
//! Everything the relay reads from its environment, loaded once at startup
//! and injected into the handlers through [`crate::state::AppState`].
//! Missing upstream secrets are not startup errors; the handlers report
//! them per request.

use axum::http::HeaderValue;
use relay_core::Credentials;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Invalid configuration values (startup errors)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("HOST:PORT is not a socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("FRONTEND_URL is not a valid origin header value: {0:?}")]
    InvalidFrontendUrl(String),

    #[error("UPSTREAM_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),

    #[error("{0} must be true or false, got {1:?}")]
    InvalidFlag(&'static str, String),
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment label (development, staging, production)
    pub environment: String,
    /// The single origin allowed to call the API from a browser
    pub frontend_url: String,
    /// `frontend_url` validated as a header value
    pub frontend_origin: HeaderValue,
    /// ResDiary API base URL
    pub resdiary_base_url: Option<String>,
    /// ResDiary service account
    pub resdiary_username: Option<String>,
    pub resdiary_password: Option<String>,
    /// Skip TLS verification towards ResDiary
    pub resdiary_accept_invalid_certs: bool,
    /// Stripe secret key
    pub stripe_secret_key: Option<String>,
    /// Bound on every outbound call
    pub upstream_timeout: Duration,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables (and a `.env` file if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let frontend_url = get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());
        let frontend_origin = HeaderValue::from_str(&frontend_url)
            .map_err(|_| ConfigError::InvalidFrontendUrl(frontend_url.clone()))?;

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let config = Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            frontend_url,
            frontend_origin,
            resdiary_base_url: get("RESDIARY_API_BASE_URL"),
            resdiary_username: get("RESDIARY_USERNAME"),
            resdiary_password: get("RESDIARY_PASSWORD"),
            resdiary_accept_invalid_certs: parse_flag(
                "RESDIARY_ACCEPT_INVALID_CERTS",
                get("RESDIARY_ACCEPT_INVALID_CERTS"),
            )?,
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            upstream_timeout,
            json_logs: get("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        };

        // Fail at startup rather than at bind time
        config.socket_addr()?;

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ConfigError::InvalidSocketAddr(raw))
    }

    /// Service account, if both halves are configured
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(
            self.resdiary_username.clone(),
            self.resdiary_password.clone(),
        )
    }

    pub fn credentials_configured(&self) -> bool {
        self.resdiary_username.is_some() && self.resdiary_password.is_some()
    }

    pub fn stripe_configured(&self) -> bool {
        self.stripe_secret_key.is_some()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Secrets are reported by presence only
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("resdiary_base_url", &self.resdiary_base_url)
            .field("credentials_configured", &self.credentials_configured())
            .field(
                "resdiary_accept_invalid_certs",
                &self.resdiary_accept_invalid_certs,
            )
            .field("stripe_configured", &self.stripe_configured())
            .field("upstream_timeout", &self.upstream_timeout)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

fn parse_flag(name: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::InvalidFlag(name, v.to_string())),
    }
}
