//! # Booking Relay
//!
//! Relays ResDiary logins and verifies Stripe checkout sessions for the
//! booking widget.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export RESDIARY_API_BASE_URL=https://api.resdiary.com
//! export RESDIARY_USERNAME=...
//! export RESDIARY_PASSWORD=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export FRONTEND_URL=http://localhost:3000
//!
//! # Run the server
//! booking-relay
//! ```

use anyhow::Context;
use relay_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Print banner
    print_banner();

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);
    info!("Frontend URL: {}", config.frontend_url);
    info!(
        "ResDiary auth: {}",
        if config.credentials_configured() {
            "configured"
        } else {
            "NOT CONFIGURED"
        }
    );
    info!(
        "Stripe: {}",
        if config.stripe_configured() {
            "configured"
        } else {
            "NOT CONFIGURED"
        }
    );

    // Initialize application state
    let state = AppState::new(config)?;

    // Create router
    let app = routes::create_router(state);

    info!("🚀 Booking relay starting on http://{}", addr);

    if !is_prod {
        info!("  POST http://{}/api/auth - Authenticate with ResDiary API", addr);
        info!("  GET  http://{}/api/auth/health - Auth service health check", addr);
        info!("  GET  http://{}/api/health - Health check", addr);
        info!("  GET  http://{}/api/verify-payment?session_id=xxx - Verify payment", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Booking Relay
  ━━━━━━━━━━━━━━━━━━━━━━━
  ResDiary login relay + Stripe verification
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping...");
}
