//! # relay-api
//!
//! HTTP front door for booking-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server with CORS and access logging
//! - The login relay and payment verification endpoints
//! - A JSON fallback for unknown routes and panics
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Service banner |
//! | POST | `/api/auth` | Log in to ResDiary |
//! | GET | `/api/auth/health` | Auth health check |
//! | GET | `/api/verify-payment?session_id=` | Verify a Stripe checkout session |
//! | GET | `/api/cancel-payment?session_id=` | Cancel an order (test mode) |
//! | GET | `/api/health` | Health check |

pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use routes::create_router;
pub use state::AppState;
