mod common;

use axum::body::{to_bytes, Body};
use common::{call, get_json, post_json, test_app, OPERATOR_TOKEN};
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

#[tokio::test]
async fn evidence_to_paid_challan_in_demo_mode() {
    let app = test_app();

    let upload = Request::builder()
        .method("POST")
        .uri("/v1/evidence?file_name=signal-04.jpg")
        .body(Body::from(&b"jpeg-bytes"[..]))
        .expect("request");
    let response = app.clone().oneshot(upload).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value = serde_json::from_slice(
        &to_bytes(response.into_body(), usize::MAX).await.expect("body"),
    )
    .expect("json");

    let (status, detection) = post_json(
        app.clone(),
        "/v1/process-evidence",
        json!({"image_url": uploaded["public_url"], "queue_id": uploaded["queue_id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let detected = &detection["result"]["vehicles_detected"][0];
    assert_eq!(detected["plate_number"], "AP16BZ3508");
    assert_eq!(detected["violations"], json!(["helmet"]));

    let (status, lookup) = call(
        app.clone(),
        Method::POST,
        "/v1/vehicle-lookup",
        Some(json!({"plate_number": "AP16BZ3508"})),
        Some(OPERATOR_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lookup["mock"], true);
    assert_eq!(lookup["data"]["state"], "Andhra Pradesh");

    let (status, issued) = post_json(
        app.clone(),
        "/v1/create-challan",
        json!({
            "plate_number": "AP16BZ3508",
            "violation_type": "helmet",
            "state": lookup["data"]["state"],
            "image_url": uploaded["public_url"],
            "evidence_urls": [uploaded["public_url"]],
            "vehicle_data": lookup["data"],
            "ai_detection_data": {
                "result": detection["result"],
                "original_plate": "AP16BZ3508",
                "final_plate": "AP16BZ3508",
                "plate_corrections": [],
            },
            "violation_id": detection["violation_ids"][0],
            "issued_by": "demo-operator",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(issued["challan_number"]
        .as_str()
        .expect("number")
        .starts_with("ECH-AP-"));
    assert_eq!(issued["fine_amount"], 1035);
    assert_eq!(issued["challan"]["vehicle_id"], detection["vehicle_ids"][0]);
    let challan_id = issued["challan"]["id"].as_str().expect("id").to_string();
    let token = issued["challan"]["public_token"].as_str().expect("token").to_string();

    let (status, sms) = post_json(app.clone(), "/v1/send-challan-sms", json!({"challan_id": challan_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sms["mock"], true);

    let (_, order) = post_json(
        app.clone(),
        "/v1/razorpay-payment",
        json!({"action": "create_order", "public_token": token}),
    )
    .await;
    let (status, _) = post_json(
        app.clone(),
        "/v1/razorpay-payment",
        json!({
            "action": "verify_payment",
            "razorpay_order_id": order["order_id"],
            "razorpay_payment_id": "pay_demo_1",
            "razorpay_signature": "unchecked",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, public) = get_json(app.clone(), &format!("/v1/public-challan?token={token}")).await;
    assert_eq!(public["challan"]["status"], "closed");
    assert_eq!(public["challan"]["payment_status"], "paid");

    let (_, stats) = get_json(app, "/v1/dashboard/stats").await;
    assert_eq!(stats["stats"]["total_challans"], 1);
    assert_eq!(stats["stats"]["paid_challans"], 1);
    assert_eq!(stats["stats"]["collected_revenue"], 1035);
    assert_eq!(stats["stats"]["sms_sent"], 1);
    assert_eq!(stats["stats"]["evidence_processed"], 1);
}

#[tokio::test]
async fn plate_corrections_survive_issuance() {
    let app = test_app();
    let corrections = json!([
        {"original": "AP16BZ35O8", "corrected": "AP16BZ3500", "corrected_at": 1_760_000_000_000_i64},
        {"original": "AP16BZ3500", "corrected": "AP16BZ3508", "corrected_at": 1_760_000_005_000_i64},
    ]);

    let (status, issued) = post_json(
        app.clone(),
        "/v1/create-challan",
        json!({
            "plate_number": "AP16BZ3508",
            "violation_type": "helmet",
            "state": "AP",
            "ai_detection_data": {
                "original_plate": "AP16BZ35O8",
                "final_plate": "AP16BZ3508",
                "plate_corrections": corrections,
            },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{issued}");
    let challan_id = issued["challan"]["id"].as_str().expect("id").to_string();

    let (status, fetched) = get_json(app, &format!("/v1/challans/{challan_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let audit = &fetched["challan"]["ai_detection_data"];
    assert_eq!(audit["original_plate"], "AP16BZ35O8");
    assert_eq!(audit["final_plate"], "AP16BZ3508");
    assert_eq!(audit["plate_corrections"], corrections);
    assert_eq!(fetched["challan"]["plate_number"], "AP16BZ3508");
}
