use async_trait::async_trait;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use relay_api::{create_router, AppConfig, AppState};
use relay_core::{
    AuthResponse, BoxedIdentityProvider, BoxedPaymentGateway, CheckoutSessionSummary,
    Credentials, IdentityProvider, PaymentGateway, SessionLineItem, UpstreamError,
    UpstreamResult,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- fakes ---

struct FakeIdentity {
    reply: UpstreamResult<AuthResponse>,
    calls: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn authenticate(&self, _credentials: &Credentials) -> UpstreamResult<AuthResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }

    fn provider_name(&self) -> &'static str {
        "fake-identity"
    }
}

struct FakeGateway {
    session: UpstreamResult<CheckoutSessionSummary>,
    items: Vec<SessionLineItem>,
    calls: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn fetch_session(&self, _id: &str) -> UpstreamResult<CheckoutSessionSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.session.clone()
    }

    async fn fetch_line_items(&self, _id: &str) -> UpstreamResult<Vec<SessionLineItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fake-gateway"
    }
}

fn identity(reply: UpstreamResult<AuthResponse>) -> Arc<FakeIdentity> {
    Arc::new(FakeIdentity {
        reply,
        calls: AtomicUsize::new(0),
    })
}

fn gateway(payment_status: &str, items: Vec<SessionLineItem>) -> Arc<FakeGateway> {
    Arc::new(FakeGateway {
        session: Ok(CheckoutSessionSummary {
            id: "cs_test_42".to_string(),
            payment_status: payment_status.to_string(),
            status: Some("complete".to_string()),
            customer_email: Some("guest@example.com".to_string()),
        }),
        items,
        calls: AtomicUsize::new(0),
    })
}

fn failing_gateway(err: UpstreamError) -> Arc<FakeGateway> {
    Arc::new(FakeGateway {
        session: Err(err),
        items: Vec::new(),
        calls: AtomicUsize::new(0),
    })
}

fn line_item(description: &str, amount_total: i64) -> SessionLineItem {
    SessionLineItem {
        description: Some(description.to_string()),
        product_name: None,
        amount_total,
    }
}

// --- setup ---

const CONFIGURED: &[(&str, &str)] = &[
    ("RESDIARY_USERNAME", "svc-widget"),
    ("RESDIARY_PASSWORD", "s3cret"),
    ("FRONTEND_URL", "https://widget.example.com"),
];

fn config(vars: &[(&str, &str)]) -> AppConfig {
    AppConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap()
}

fn server(
    vars: &[(&str, &str)],
    identity: Option<Arc<FakeIdentity>>,
    gateway: Option<Arc<FakeGateway>>,
) -> TestServer {
    let state = AppState::with_upstreams(
        config(vars),
        identity.map(|i| i as BoxedIdentityProvider),
        gateway.map(|g| g as BoxedPaymentGateway),
    );
    TestServer::new(create_router(state)).unwrap()
}

fn token_reply() -> UpstreamResult<AuthResponse> {
    Ok(AuthResponse {
        token: Some("eyJ.token".to_string()),
        token_expiry_utc: Some("2026-10-19T13:00:00Z".to_string()),
    })
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let server = server(&[], None, None);
    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn auth_health_reports_credentials() {
    let body: Value = server(&[], None, None).get("/api/auth/health").await.json();
    assert_eq!(body["credentialsConfigured"], false);

    let body: Value = server(CONFIGURED, None, None)
        .get("/api/auth/health")
        .await
        .json();
    assert_eq!(body["credentialsConfigured"], true);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn root_banner() {
    let body: Value = server(&[], None, None).get("/").await.json();
    assert_eq!(body["message"], "Booking Widget API Server");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let response = server(&[], None, None).get("/api/nope").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

// --- auth ---

#[tokio::test]
async fn login_relays_token() {
    let fake = identity(token_reply());
    let response = server(CONFIGURED, Some(fake.clone()), None)
        .post("/api/auth")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": true,
            "token": "eyJ.token",
            "tokenExpiryUtc": "2026-10-19T13:00:00Z"
        })
    );
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_without_credentials_is_500_without_upstream_call() {
    let fake = identity(token_reply());
    for vars in [
        &[][..],
        &[("RESDIARY_USERNAME", "svc-widget")][..],
        &[("RESDIARY_PASSWORD", "s3cret")][..],
    ] {
        let response = server(vars, Some(fake.clone()), None).post("/api/auth").await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({
                "success": false,
                "error": "Server configuration error: Missing API credentials"
            })
        );
    }
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_maps_upstream_statuses() {
    let cases = [
        (400, StatusCode::BAD_REQUEST),
        (401, StatusCode::UNAUTHORIZED),
        (403, StatusCode::FORBIDDEN),
        (404, StatusCode::NOT_FOUND),
        (500, StatusCode::BAD_GATEWAY),
        (429, StatusCode::TOO_MANY_REQUESTS),
    ];
    for (upstream, expected) in cases {
        let fake = identity(Err(UpstreamError::Status {
            status: upstream,
            message: None,
        }));
        let response = server(CONFIGURED, Some(fake), None).post("/api/auth").await;
        assert_eq!(response.status_code(), expected, "upstream {}", upstream);
        assert_eq!(response.json::<Value>()["success"], false);
    }
}

#[tokio::test]
async fn login_missing_token_is_401() {
    let fake = identity(Ok(AuthResponse::default()));
    let response = server(CONFIGURED, Some(fake), None).post("/api/auth").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Invalid authentication response from ResDiary API"
    );
}

#[tokio::test]
async fn login_transport_failures() {
    let fake = identity(Err(UpstreamError::Unreachable("refused".into())));
    let response = server(CONFIGURED, Some(fake), None).post("/api/auth").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let fake = identity(Err(UpstreamError::Transport("timed out".into())));
    let response = server(CONFIGURED, Some(fake), None).post("/api/auth").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["error"],
        "Network error during authentication"
    );
}

#[tokio::test]
async fn cors_preflight_allows_frontend() {
    let response = server(CONFIGURED, None, None)
        .method(Method::OPTIONS, "/api/auth")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("https://widget.example.com"),
        )
        .add_header(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        )
        .await;

    response.assert_status_ok();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://widget.example.com"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

// Answered by the CORS layer; there is no OPTIONS route
#[tokio::test]
async fn bare_options_on_auth_is_ok() {
    let response = server(CONFIGURED, None, None)
        .method(Method::OPTIONS, "/api/auth")
        .await;
    response.assert_status_ok();
}

// --- verify-payment ---

#[tokio::test]
async fn verify_paid_session() {
    let fake = gateway("paid", vec![line_item("Cruise Package", 2550)]);
    let response = server(&[], None, Some(fake))
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": true,
            "paid": true,
            "drink": "Cruise Package",
            "amount": 25.5,
            "session_id": "cs_test_42",
            "customer_email": "guest@example.com"
        })
    );
}

#[tokio::test]
async fn verify_paid_session_without_items() {
    let fake = gateway("paid", Vec::new());
    let body: Value = server(&[], None, Some(fake))
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await
        .json();

    assert_eq!(body["drink"], "Unknown Drink");
    assert_eq!(body["amount"], 0);
}

#[tokio::test]
async fn verify_unpaid_session_is_200() {
    let fake = gateway("unpaid", Vec::new());
    let response = server(&[], None, Some(fake))
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": false,
            "paid": false,
            "payment_status": "unpaid",
            "error": "Payment not completed"
        })
    );
}

#[tokio::test]
async fn verify_without_session_id_is_400() {
    let fake = gateway("paid", Vec::new());
    let server = server(&[], None, Some(fake.clone()));

    for response in [
        server.get("/api/verify-payment").await,
        server
            .get("/api/verify-payment")
            .add_query_param("session_id", "")
            .await,
    ] {
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({"success": false, "error": "session_id is required"})
        );
    }
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_query_string_gets_json_error() {
    let fake = gateway("paid", Vec::new());
    let server = server(&[], None, Some(fake.clone()));

    for path in ["/api/verify-payment", "/api/cancel-payment"] {
        let response = server
            .get(path)
            .add_query_param("session_id", "cs_a")
            .add_query_param("session_id", "cs_b")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("session_id"));
    }
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verify_unknown_session_is_400() {
    let fake = failing_gateway(UpstreamError::InvalidRequest("No such checkout.session".into()));
    let response = server(&[], None, Some(fake))
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_bogus")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid session ID");
}

#[tokio::test]
async fn verify_upstream_failure_is_opaque_500() {
    let fake = failing_gateway(UpstreamError::Transport("connection reset by peer".into()));
    let response = server(&[], None, Some(fake))
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"success": false, "error": "Internal server error"})
    );
}

#[tokio::test]
async fn verify_without_stripe_key_is_500() {
    let response = server(&[], None, None)
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn repeated_verification_is_identical() {
    let fake = gateway("paid", vec![line_item("Cruise Package", 2550)]);
    let server = server(&[], None, Some(fake));

    let first: Value = server
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await
        .json();
    let second: Value = server
        .get("/api/verify-payment")
        .add_query_param("session_id", "cs_test_42")
        .await
        .json();
    assert_eq!(first, second);
}

// --- cancel-payment ---

#[tokio::test]
async fn cancel_is_simulated() {
    let fake = gateway("paid", Vec::new());
    let response = server(&[], None, Some(fake.clone()))
        .get("/api/cancel-payment")
        .add_query_param("session_id", "cs_test_42")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": true,
            "type": "cancelled",
            "message": "Order has been cancelled successfully (TEST MODE)",
            "session_id": "cs_test_42"
        })
    );
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_without_session_id_is_400() {
    let response = server(&[], None, None).get("/api/cancel-payment").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
