//! # relay-core
//!
//! Core types and result translation for booking-relay.
//!
//! This crate provides:
//! - `IdentityProvider` and `PaymentGateway` traits over the upstream APIs
//! - `CredentialGate`, which relays a service-account login
//! - `PurchaseVerifier`, which confirms a checkout session was paid
//! - `RelayError` / `UpstreamError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{CredentialGate, Credentials, PurchaseVerifier};
//!
//! let gate = CredentialGate::new(Some(identity), Credentials::from_parts(user, pass));
//! let token = gate.login().await?;
//!
//! let verifier = PurchaseVerifier::new(Some(gateway));
//! let outcome = verifier.verify(Some("cs_test_...")).await?;
//! ```

pub mod auth;
pub mod error;
pub mod gate;
pub mod payment;
pub mod translate;
pub mod verifier;

// Re-exports for convenience
pub use auth::{AuthResponse, AuthResult, BoxedIdentityProvider, Credentials, IdentityProvider};
pub use error::{RelayError, RelayResult, UpstreamError, UpstreamResult};
pub use gate::CredentialGate;
pub use payment::{
    BoxedPaymentGateway, CheckoutSessionSummary, MajorUnits, PaymentGateway,
    PaymentVerification, SessionLineItem, VerificationOutcome,
};
pub use verifier::{require_session_id, PurchaseVerifier};
