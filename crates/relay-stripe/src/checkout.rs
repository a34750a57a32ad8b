//! # Stripe Checkout Sessions
//!
//! Read-only access to Checkout Sessions: retrieve a session and list its
//! line items. Stripe's `invalid_request_error` is reported as
//! [`UpstreamError::InvalidRequest`]; every other failure keeps its status.

use crate::config::StripeConfig;
use async_trait::async_trait;
use relay_core::{
    CheckoutSessionSummary, PaymentGateway, SessionLineItem, UpstreamError, UpstreamResult,
};
use reqwest::{Client, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Stripe error type for malformed requests and unknown objects
const INVALID_REQUEST_ERROR: &str = "invalid_request_error";

/// Errors building the gateway
#[derive(Debug, Error)]
pub enum StripeClientError {
    #[error("Invalid Stripe API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Stripe Checkout Sessions gateway
pub struct StripeCheckoutGateway {
    config: StripeConfig,
    base_url: Url,
    client: Client,
}

impl StripeCheckoutGateway {
    /// Create a new gateway
    pub fn new(config: StripeConfig) -> Result<Self, StripeClientError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| StripeClientError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StripeClientError::InvalidBaseUrl(
                config.api_base_url.clone(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// `/v1/checkout/sessions/{id}[/suffix]`, with the id percent-encoded
    /// as a single path segment.
    fn session_url(&self, session_id: &str, suffix: Option<&str>) -> UpstreamResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| UpstreamError::Transport("Stripe base URL cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .extend(["v1", "checkout", "sessions", session_id]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> UpstreamResult<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(classify_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            UpstreamError::Decode(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckoutGateway {
    #[instrument(skip(self))]
    async fn fetch_session(&self, session_id: &str) -> UpstreamResult<CheckoutSessionSummary> {
        let url = self.session_url(session_id, None)?;
        let session: StripeCheckoutSession = self.get_json(url, &[]).await?;

        debug!(
            "Retrieved Stripe session: id={}, payment_status={}",
            session.id, session.payment_status
        );

        Ok(CheckoutSessionSummary {
            id: session.id,
            payment_status: session.payment_status,
            status: session.status,
            customer_email: session.customer_details.and_then(|c| c.email),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_line_items(&self, session_id: &str) -> UpstreamResult<Vec<SessionLineItem>> {
        let url = self.session_url(session_id, Some("line_items"))?;
        let list: StripeList<StripeLineItem> = self
            .get_json(url, &[("expand[]", "data.price.product")])
            .await?;

        debug!("Retrieved {} Stripe line items", list.data.len());

        Ok(list.data.into_iter().map(SessionLineItem::from).collect())
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

fn classify_error_body(status: u16, body: &str) -> UpstreamError {
    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(StripeErrorResponse { error }) if error.error_type == INVALID_REQUEST_ERROR => {
            UpstreamError::InvalidRequest(error.message.unwrap_or_default())
        }
        Ok(StripeErrorResponse { error }) => UpstreamError::Status {
            status,
            message: error.message,
        },
        Err(_) => UpstreamError::Status {
            status,
            message: None,
        },
    }
}

fn classify_transport_error(err: &reqwest::Error) -> UpstreamError {
    if err.is_connect() && !err.is_timeout() {
        UpstreamError::Unreachable(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    payment_status: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeLineItem {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    amount_total: i64,
    #[serde(default)]
    price: Option<StripePrice>,
}

#[derive(Debug, Deserialize)]
struct StripePrice {
    #[serde(default)]
    product: Option<StripeProductRef>,
}

/// `price.product` is an id string unless the request expanded it.
/// `Expanded` comes first: `IgnoredAny` would also accept an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StripeProductRef {
    Expanded {
        #[serde(default)]
        name: Option<String>,
    },
    Id(IgnoredAny),
}

impl From<StripeLineItem> for SessionLineItem {
    fn from(item: StripeLineItem) -> Self {
        let product_name = item
            .price
            .and_then(|p| p.product)
            .and_then(|product| match product {
                StripeProductRef::Expanded { name } => name,
                StripeProductRef::Id(_) => None,
            });

        SessionLineItem {
            description: item.description,
            product_name,
            amount_total: item.amount_total,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    message: Option<String>,
}
