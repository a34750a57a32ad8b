//! # Application State
//!
//! Shared state for the Axum application: the two relay components and the
//! configuration they were built from. Nothing in here is mutated after
//! startup.

use crate::config::AppConfig;
use relay_core::{BoxedIdentityProvider, BoxedPaymentGateway, CredentialGate, PurchaseVerifier};
use relay_resdiary::{ResDiaryClient, ResDiaryConfig};
use relay_stripe::{StripeCheckoutGateway, StripeConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Login relay
    pub gate: CredentialGate,
    /// Payment verification
    pub verifier: PurchaseVerifier,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with the real upstream clients.
    ///
    /// Upstreams without configuration are left out; their handlers answer
    /// with a configuration error instead.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let identity = match &config.resdiary_base_url {
            Some(base_url) => {
                let resdiary = ResDiaryConfig::new(base_url)
                    .with_timeout(config.upstream_timeout)
                    .with_accept_invalid_certs(config.resdiary_accept_invalid_certs);
                let client = ResDiaryClient::new(resdiary)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize ResDiary client: {}", e))?;
                Some(Arc::new(client) as BoxedIdentityProvider)
            }
            None => {
                warn!("RESDIARY_API_BASE_URL not set; /api/auth will report a configuration error");
                None
            }
        };

        let gateway = match &config.stripe_secret_key {
            Some(key) => {
                let stripe = StripeConfig::new(key.clone()).with_timeout(config.upstream_timeout);
                if stripe.is_test_mode() {
                    info!("Stripe client using a test-mode key");
                }
                let gateway = StripeCheckoutGateway::new(stripe)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
                Some(Arc::new(gateway) as BoxedPaymentGateway)
            }
            None => {
                warn!("STRIPE_SECRET_KEY not set; /api/verify-payment will report a configuration error");
                None
            }
        };

        Ok(Self::with_upstreams(config, identity, gateway))
    }

    /// Build state around the given upstreams (real clients or test fakes)
    pub fn with_upstreams(
        config: AppConfig,
        identity: Option<BoxedIdentityProvider>,
        gateway: Option<BoxedPaymentGateway>,
    ) -> Self {
        Self {
            gate: CredentialGate::new(identity, config.credentials()),
            verifier: PurchaseVerifier::new(gateway),
            config: Arc::new(config),
        }
    }
}
