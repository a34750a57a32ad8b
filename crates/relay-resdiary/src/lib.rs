//! # relay-resdiary
//!
//! ResDiary identity client for booking-relay.
//!
//! Implements [`relay_core::IdentityProvider`] by posting the service
//! account to `POST {base}/api/Jwt/v2/Authenticate` and classifying the
//! outcome into [`relay_core::UpstreamError`].
//!
//! ```rust,ignore
//! use relay_resdiary::{ResDiaryClient, ResDiaryConfig};
//!
//! let client = ResDiaryClient::new(ResDiaryConfig::new("https://api.resdiary.com"))?;
//! let response = client.authenticate(&credentials).await?;
//! ```

pub mod client;
pub mod config;

pub use client::ResDiaryClient;
pub use config::ResDiaryConfig;
