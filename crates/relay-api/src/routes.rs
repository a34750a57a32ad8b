//! # Routes
//!
//! Axum router configuration for the relay.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
///
/// Routes:
/// - GET     /                    - Service banner
/// - POST    /api/auth            - Log in to ResDiary
/// - OPTIONS /api/auth            - Preflight (answered by the CORS layer)
/// - GET     /api/auth/health     - Auth service health
/// - GET     /api/verify-payment  - Verify a checkout session
/// - GET     /api/cancel-payment  - Cancel an order (test mode)
/// - GET     /api/health          - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.frontend_origin.clone());

    let api_routes = Router::new()
        // OPTIONS /auth never reaches the router: the CORS layer answers it
        .route("/auth", post(handlers::login))
        .route("/auth/health", get(handlers::auth_health))
        .route("/verify-payment", get(handlers::verify_payment))
        .route("/cancel-payment", get(handlers::cancel_payment))
        .route("/health", get(handlers::health));

    let router = Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes)
        .fallback(handlers::not_found);

    with_middleware(router, cors).with_state(state)
}

/// Access logging, then CORS, then the panic catcher, so that the generic
/// 500 still carries the CORS headers the frontend needs to read it
fn with_middleware<S>(router: Router<S>, cors: CorsLayer) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(CatchPanicLayer::custom(handlers::handle_panic)),
    )
}

/// CORS for the single configured frontend origin, with credentials
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}
