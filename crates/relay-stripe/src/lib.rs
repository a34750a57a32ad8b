//! # relay-stripe
//!
//! Stripe Checkout Sessions client for booking-relay.
//!
//! Implements [`relay_core::PaymentGateway`] with two read-only calls:
//!
//! 1. `GET /v1/checkout/sessions/{id}`: payment status and customer email
//! 2. `GET /v1/checkout/sessions/{id}/line_items`: what was bought, with
//!    `price.product` expanded so product names are available
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_stripe::{StripeCheckoutGateway, StripeConfig};
//!
//! let gateway = StripeCheckoutGateway::new(StripeConfig::new(secret_key))?;
//! let session = gateway.fetch_session("cs_test_...").await?;
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::{StripeCheckoutGateway, StripeClientError};
pub use config::StripeConfig;
