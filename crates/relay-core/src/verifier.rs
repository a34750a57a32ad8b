//! # Purchase Verifier
//!
//! Confirms a checkout session was paid and extracts what was bought.
//! Read-only: a session lookup, then a line-item lookup for paid sessions.

use crate::error::{RelayError, RelayResult, UpstreamError};
use crate::payment::{
    BoxedPaymentGateway, MajorUnits, PaymentVerification, SessionLineItem, VerificationOutcome,
};
use tracing::{error, info, instrument};

pub const SESSION_ID_REQUIRED: &str = "session_id is required";
pub const INVALID_SESSION_ID: &str = "Invalid session ID";
pub const MISSING_PAYMENT_KEY: &str = "Server configuration error: Missing payment credentials";

/// Name reported when a paid session has no line items
pub const UNKNOWN_ITEM: &str = "Unknown Drink";
/// Name reported when the first line item has neither description nor product name
pub const DEFAULT_ITEM: &str = "Drink Package";

/// Stateless payment verification
#[derive(Clone)]
pub struct PurchaseVerifier {
    gateway: Option<BoxedPaymentGateway>,
}

impl PurchaseVerifier {
    /// `gateway` is `None` when no payment API key is configured.
    pub fn new(gateway: Option<BoxedPaymentGateway>) -> Self {
        Self { gateway }
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_some()
    }

    /// Verify the session named by the caller.
    #[instrument(skip(self))]
    pub async fn verify(&self, session_id: Option<&str>) -> RelayResult<VerificationOutcome> {
        let session_id = require_session_id(session_id)?;

        let gateway = self.gateway.as_ref().ok_or_else(|| {
            error!("Payment API key is not configured");
            RelayError::Configuration(MISSING_PAYMENT_KEY.to_string())
        })?;

        info!("Verifying payment for session: {}", session_id);

        let session = gateway
            .fetch_session(session_id)
            .await
            .map_err(translate_payment_error)?;

        info!(
            id = %session.id,
            payment_status = %session.payment_status,
            status = ?session.status,
            "Session retrieved"
        );

        if !session.is_paid() {
            return Ok(VerificationOutcome::NotPaid {
                payment_status: session.payment_status,
            });
        }

        let line_items = gateway
            .fetch_line_items(session_id)
            .await
            .map_err(translate_payment_error)?;

        let (item_description, amount) = summarize_line_items(&line_items);

        Ok(VerificationOutcome::Paid(PaymentVerification {
            session_id: session.id,
            item_description,
            amount,
            customer_email: session.customer_email,
        }))
    }
}

/// Reject a missing or empty session id before any outbound call
pub fn require_session_id(session_id: Option<&str>) -> RelayResult<&str> {
    session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RelayError::Validation(SESSION_ID_REQUIRED.to_string()))
}

/// Describe the purchase from its first line item only
fn summarize_line_items(items: &[SessionLineItem]) -> (String, MajorUnits) {
    let Some(item) = items.first() else {
        return (UNKNOWN_ITEM.to_string(), MajorUnits::ZERO);
    };

    let name = item
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .or_else(|| item.product_name.as_deref().filter(|n| !n.is_empty()))
        .unwrap_or(DEFAULT_ITEM)
        .to_string();

    (name, MajorUnits::from_minor(item.amount_total))
}

fn translate_payment_error(err: UpstreamError) -> RelayError {
    error!(error = %err, "Error verifying payment");

    match err {
        UpstreamError::InvalidRequest(_) => RelayError::Validation(INVALID_SESSION_ID.to_string()),
        other => RelayError::Internal(other.to_string()),
    }
}
