mod common;

use common::{call_raw, test_app, OPERATOR_TOKEN};
use http::StatusCode;
use serde_json::Value;

const JSON: Option<&str> = Some("application/json");

fn assert_envelope(body: &Value, code: &str) {
    assert_eq!(body["success"], false, "{body}");
    assert_eq!(body["error_code"], code, "{body}");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{body}");
}

#[tokio::test]
async fn lookup_without_token_is_unauthorized_whatever_the_body() {
    let (status, body) = call_raw(test_app(), "/v1/vehicle-lookup", None, "", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_envelope(&body, "MISSING_BEARER_TOKEN");

    let (status, body) = call_raw(
        test_app(),
        "/v1/vehicle-lookup",
        JSON,
        r#"{"plate_number":123}"#,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_envelope(&body, "MISSING_BEARER_TOKEN");
}

#[tokio::test]
async fn lookup_with_token_and_mistyped_body_is_bad_request() {
    let (status, body) = call_raw(
        test_app(),
        "/v1/vehicle-lookup",
        JSON,
        r#"{"plate_number":123}"#,
        Some(OPERATOR_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, "INVALID_BODY");

    let (status, body) = call_raw(
        test_app(),
        "/v1/vehicle-lookup",
        None,
        r#"{"plate_number":"AP16BZ3508"}"#,
        Some(OPERATOR_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, "INVALID_BODY");
}

#[tokio::test]
async fn create_challan_bad_bodies_use_the_envelope() {
    let (status, body) = call_raw(
        test_app(),
        "/v1/create-challan",
        JSON,
        r#"{"plate_number":"AP16BZ3508","violation_type":"helmet","state":"AP","custom_fine_amount":"abc"}"#,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, "INVALID_BODY");

    let (status, body) = call_raw(test_app(), "/v1/create-challan", JSON, "", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, "INVALID_BODY");
}

#[tokio::test]
async fn unknown_payment_action_uses_the_envelope() {
    let (status, body) = call_raw(
        test_app(),
        "/v1/razorpay-payment",
        JSON,
        r#"{"action":"refund"}"#,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, "INVALID_BODY");
}

#[tokio::test]
async fn open_routes_reject_malformed_json_with_the_envelope() {
    for uri in ["/v1/process-evidence", "/v1/send-challan-sms", "/v1/gate-entries"] {
        let (status, body) = call_raw(test_app(), uri, JSON, "{not json", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_envelope(&body, "INVALID_BODY");
    }
}

#[tokio::test]
async fn operator_writes_check_the_token_before_the_body() {
    for uri in ["/v1/violations", "/v1/fines", "/v1/cameras", "/v1/gates", "/v1/vehicles"] {
        let (status, body) = call_raw(test_app(), uri, JSON, "{not json", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_envelope(&body, "MISSING_BEARER_TOKEN");

        let (status, body) =
            call_raw(test_app(), uri, JSON, "{not json", Some(OPERATOR_TOKEN)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_envelope(&body, "INVALID_BODY");
    }
}
