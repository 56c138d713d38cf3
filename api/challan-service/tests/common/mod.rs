#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::Router;
use challan_service::app::{build_router, AppState};
use challan_service::config::environment::AppConfig;
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const OPERATOR_TOKEN: &str = "operator-session-token";

/// Every integration unconfigured, memory-only store, private evidence directory.
pub fn test_config() -> AppConfig {
    let evidence_dir = std::env::temp_dir()
        .join(format!("echallan-test-{}", Uuid::new_v4().simple()))
        .to_string_lossy()
        .to_string();
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        redis_url: None,
        public_app_url: "https://echallan.test".to_string(),
        public_api_url: "http://127.0.0.1:8090".to_string(),
        evidence_dir,
        max_evidence_bytes: 1024 * 1024,
        fine_schedule_path: "config/fine_schedule.json".to_string(),
        default_fine_amount: 500,
        ai_gateway_url: "http://127.0.0.1:9/unused".to_string(),
        ai_gateway_api_key: None,
        ai_model: "test-model".to_string(),
        vehicle_registry_api_url: "http://127.0.0.1:9/unused".to_string(),
        vehicle_registry_api_key: None,
        msg91_auth_key: None,
        msg91_sender_id: "ECHALN".to_string(),
        msg91_template_id: None,
        msg91_api_url: "http://127.0.0.1:9/unused".to_string(),
        razorpay_key_id: None,
        razorpay_key_secret: None,
        razorpay_api_url: "http://127.0.0.1:9/unused".to_string(),
        payment_verify_signature: false,
        operator_jwt_secret: None,
        upstream_timeout_seconds: Some(5),
    }
}

pub fn test_app() -> Router {
    build_router(AppState::new(test_config(), None))
}

pub async fn call(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_authed(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(body), Some(OPERATOR_TOKEN)).await
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, None, None).await
}

pub async fn issue_challan(app: Router, plate: &str, violation_type: &str, state: &str) -> Value {
    let (status, body) = post_json(
        app,
        "/v1/create-challan",
        json!({
            "plate_number": plate,
            "violation_type": violation_type,
            "state": state,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Sends `body` verbatim, so malformed or untyped payloads reach the router as-is.
pub async fn call_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = serde_json::from_slice(&bytes).expect("json error envelope");
    (status, value)
}
