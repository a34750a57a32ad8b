//! # Payment Types
//!
//! Checkout session data as read from the payment API, the gateway trait,
//! and the verification result reported to callers.

use crate::error::UpstreamResult;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Status string the payment API uses for a completed payment
pub const PAID: &str = "paid";

/// Checkout session fields the verifier needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionSummary {
    pub id: String,
    /// `paid`, `unpaid` or `no_payment_required`
    pub payment_status: String,
    /// `open`, `complete` or `expired`
    pub status: Option<String>,
    pub customer_email: Option<String>,
}

impl CheckoutSessionSummary {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PAID
    }
}

/// A purchased line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
    pub description: Option<String>,
    /// Display name of the attached product, when the API expanded it
    pub product_name: Option<String>,
    /// Total in minor currency units
    pub amount_total: i64,
}

/// Narrow interface over the payment API
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Retrieve a checkout session by id.
    async fn fetch_session(&self, session_id: &str) -> UpstreamResult<CheckoutSessionSummary>;

    /// List the line items of a checkout session.
    async fn fetch_line_items(&self, session_id: &str) -> UpstreamResult<Vec<SessionLineItem>>;

    /// Name used in logs
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Amount in major currency units, rounded to two decimals.
///
/// Serializes whole amounts as JSON integers (`25`, `0`) and fractional ones
/// as floats (`25.5`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MajorUnits(f64);

impl MajorUnits {
    pub const ZERO: MajorUnits = MajorUnits(0.0);

    pub fn from_minor(minor: i64) -> Self {
        Self((minor as f64 / 100.0 * 100.0).round() / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Serialize for MajorUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < i64::MAX as f64 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Result of verifying a paid checkout session
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentVerification {
    pub session_id: String,
    pub item_description: String,
    pub amount: MajorUnits,
    pub customer_email: Option<String>,
}

/// Outcome of a verification request that reached the payment API
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// Payment completed
    Paid(PaymentVerification),
    /// Payment not (yet) completed; a normal negative answer, not an error
    NotPaid { payment_status: String },
}
