//! # Request Handlers
//!
//! Axum request handlers for the relay. Every JSON body carries a `success`
//! flag; failures are `{ success: false, error }` with the status chosen by
//! [`RelayError::status_code`].

use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use relay_core::{require_session_id, MajorUnits, RelayError, VerificationOutcome};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{error, field, info, instrument, warn, Span};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query string for the payment endpoints
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiry_utc: Option<String>,
}

/// Verification of a paid session
#[derive(Debug, Serialize)]
pub struct PaidResponse {
    pub success: bool,
    pub paid: bool,
    pub drink: String,
    pub amount: MajorUnits,
    pub session_id: String,
    pub customer_email: Option<String>,
}

/// Verification of a session whose payment has not completed
#[derive(Debug, Serialize)]
pub struct NotPaidResponse {
    pub success: bool,
    pub paid: bool,
    pub payment_status: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VerifyPaymentResponse {
    Paid(PaidResponse),
    NotPaid(NotPaidResponse),
}

impl From<VerificationOutcome> for VerifyPaymentResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Paid(v) => VerifyPaymentResponse::Paid(PaidResponse {
                success: true,
                paid: true,
                drink: v.item_description,
                amount: v.amount,
                session_id: v.session_id,
                customer_email: v.customer_email,
            }),
            VerificationOutcome::NotPaid { payment_status } => {
                VerifyPaymentResponse::NotPaid(NotPaidResponse {
                    success: false,
                    paid: false,
                    payment_status,
                    error: "Payment not completed".to_string(),
                })
            }
        }
    }
}

/// Simulated cancellation
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
    pub session_id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Handler error: a [`RelayError`] rendered as a JSON response
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_internal() {
            error!("Unhandled error: {}", self.0);
        }

        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::new(self.0.public_message()))).into_response()
    }
}

/// Unwrap the payment query string, answering a malformed one with the JSON
/// error envelope instead of axum's plain-text rejection
fn session_query(
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<SessionQuery, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected query string: {}", rejection.body_text());
        ApiError(RelayError::Validation(rejection.body_text()))
    })?;
    Span::current().record("session_id", field::debug(&query.session_id));
    Ok(query)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Handlers
// =============================================================================

/// Service banner
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Booking Widget API Server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Payment verification server is running",
        "timestamp": timestamp()
    }))
}

/// Auth service health, reporting whether the service account is configured
pub async fn auth_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Auth service is running",
        "credentialsConfigured": state.gate.credentials_configured(),
        "timestamp": timestamp()
    }))
}

/// Log in to ResDiary with the server-held service account
#[instrument(skip(state))]
pub async fn login(State(state): State<AppState>) -> Result<Json<LoginResponse>, ApiError> {
    let result = state.gate.login().await?;

    Ok(Json(LoginResponse {
        success: true,
        token: result.token,
        token_expiry_utc: result.expires_at_utc,
    }))
}

/// Verify a Stripe checkout session
#[instrument(skip_all, fields(session_id = field::Empty))]
pub async fn verify_payment(
    State(state): State<AppState>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let query = session_query(query)?;
    let outcome = state.verifier.verify(query.session_id.as_deref()).await?;
    Ok(Json(outcome.into()))
}

/// Cancel an order.
///
/// Runs in test mode: no payment API call is made and every well-formed
/// request is reported as cancelled.
// TODO: replace with a refund (paid) / session expiry (open) flow once the
// owners confirm real cancellations should be enabled.
#[instrument(skip_all, fields(session_id = field::Empty))]
pub async fn cancel_payment(
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<CancelResponse>, ApiError> {
    let query = session_query(query)?;
    let session_id = require_session_id(query.session_id.as_deref())?;

    info!("Cancelling payment for session: {}", session_id);
    warn!("TEST MODE: simulating successful cancellation");

    Ok(Json(CancelResponse {
        success: true,
        kind: "cancelled",
        message: "Order has been cancelled successfully (TEST MODE)",
        session_id: session_id.to_string(),
    }))
}

/// JSON 404 for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

/// Generic fallback for panics inside handlers
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!("Handler panicked: {}", detail);

    ApiError(RelayError::Internal(detail.to_string())).into_response()
}
