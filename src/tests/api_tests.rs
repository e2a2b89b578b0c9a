//! Router-level tests: auth gate, validation and response shape.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode as UpstreamStatus;
use serde_json::Value;
use tower::ServiceExt;

use super::support::{app_state, manual_clock, StubUpstream, PASSWORD, USER};
use crate::api::{auth::REALM_CHALLENGE, create_router};

fn app(stub: Arc<StubUpstream>) -> Router {
    create_router(app_state(stub, manual_clock()))
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

async fn send(app: &Router, method: Method, uri: &str, auth: Option<String>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_protected_route_requires_credentials() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());

    let response = send(&app, Method::GET, "/api/pedidos?cpf=12345678901", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        REALM_CHALLENGE
    );
    assert_eq!(stub.upstream_calls(), 0);
}

#[tokio::test]
async fn test_wrong_password_is_rejected_with_challenge() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?cpf=12345678901",
        Some(basic(USER, "wrong")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(stub.upstream_calls(), 0);
}

#[tokio::test]
async fn test_valid_credentials_pass_through() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?cpf=123.456.789-01",
        Some(basic(USER, PASSWORD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("X-Cache").unwrap(), "MISS");
    assert_eq!(response.headers().get("X-Total-Count").unwrap(), "1");

    let body = json_body(response).await;
    let orders = body.as_array().expect("bare JSON array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["increment_id"], "1000123456");
    assert_eq!(orders[0]["produtos"].as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["nota_fiscal"]["info"]["formatado"], "001/123");
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());
    let uri = "/api/pedidos?pedido=1000123456";

    send(&app, Method::GET, uri, Some(basic(USER, PASSWORD))).await;
    let response = send(&app, Method::GET, uri, Some(basic(USER, PASSWORD))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("X-Cache").unwrap(), "HIT");
    assert_eq!(stub.searches(), 1);
}

#[tokio::test]
async fn test_missing_parameters_make_no_upstream_call() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());

    let response = send(&app, Method::GET, "/api/pedidos", Some(basic(USER, PASSWORD))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("cpf"));
    assert_eq!(stub.upstream_calls(), 0);
}

#[tokio::test]
async fn test_conflicting_parameters_are_rejected() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?cpf=12345678901&nf=000000009",
        Some(basic(USER, PASSWORD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.upstream_calls(), 0);
}

#[tokio::test]
async fn test_upstream_unauthorized_is_a_distinct_server_error() {
    let mut stub = StubUpstream::with_sample_order();
    stub.search_failure = Some(UpstreamStatus::UNAUTHORIZED);
    let app = app(Arc::new(stub));

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?cpf=12345678901",
        Some(basic(USER, PASSWORD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Authentication with the store API failed");
}

#[tokio::test]
async fn test_other_upstream_failures_are_generic_server_errors() {
    let mut stub = StubUpstream::with_sample_order();
    stub.search_failure = Some(UpstreamStatus::BAD_GATEWAY);
    let app = app(Arc::new(stub));

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?cpf=12345678901",
        Some(basic(USER, PASSWORD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to query the store API");
    assert!(body["detail"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_unknown_order_is_an_empty_array() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub);

    let response = send(
        &app,
        Method::GET,
        "/api/pedidos?pedido=404",
        Some(basic(USER, PASSWORD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_clear_cache_requires_auth_and_empties_cache() {
    let stub = Arc::new(StubUpstream::with_sample_order());
    let app = app(stub.clone());
    let uri = "/api/pedidos?cpf=12345678901";

    send(&app, Method::GET, uri, Some(basic(USER, PASSWORD))).await;

    let denied = send(&app, Method::DELETE, "/api/cache", None).await;
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let cleared = send(&app, Method::DELETE, "/api/cache", Some(basic(USER, PASSWORD))).await;
    assert_eq!(cleared.status(), StatusCode::OK);
    let body = json_body(cleared).await;
    assert_eq!(body["cleared"], true);
    assert_eq!(body["size"], 0);

    let response = send(&app, Method::GET, uri, Some(basic(USER, PASSWORD))).await;
    assert_eq!(response.headers().get("X-Cache").unwrap(), "MISS");
    assert_eq!(stub.searches(), 2);
}

#[tokio::test]
async fn test_public_routes_skip_auth() {
    let app = app(Arc::new(StubUpstream::default()));

    for uri in ["/", "/status", "/login-info"] {
        let response = send(&app, Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{} should be public", uri);
    }

    let status = json_body(send(&app, Method::GET, "/status", None).await).await;
    assert_eq!(status["status"], "ok");
    assert_eq!(status["users_configured"], 2);
}
