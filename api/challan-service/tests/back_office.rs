mod common;

use challan_service::app::{build_router, AppState};
use common::{get_json, issue_challan, post_authed, post_json, test_app, test_config};
use http::StatusCode;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn resolving_a_violation_is_terminal() {
    let app = test_app();
    let (status, created) = post_authed(
        app.clone(),
        "/v1/violations",
        json!({"plate_number": "KA01AB1234", "violation_type": "triple_riding"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["violation"]["severity"], "high");
    assert_eq!(created["violation"]["fine_amount"], 500);
    let id = created["violation"]["id"].as_str().expect("id").to_string();

    let uri = format!("/v1/violations/{id}/resolve");
    let (status, resolved) = post_authed(
        app.clone(),
        &uri,
        json!({"resolved_by": "officer-17", "notes": "challan issued"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["violation"]["is_resolved"], true);
    assert!(resolved["violation"]["resolved_at"].is_i64());

    let (status, again) = post_authed(app.clone(), &uri, json!({"resolved_by": "someone-else"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["error_code"], "VIOLATION_ALREADY_RESOLVED");

    let (_, list) = get_json(app.clone(), "/v1/violations?resolved=true").await;
    let list = list["violations"].as_array().expect("violations").clone();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["resolved_by"], "officer-17");
    assert_eq!(list[0]["resolved_at"], resolved["violation"]["resolved_at"]);

    let (_, open) = get_json(app, "/v1/violations?resolved=false").await;
    assert!(open["violations"].as_array().expect("violations").is_empty());
}

#[tokio::test]
async fn operator_writes_require_bearer_token() {
    let (status, body) = post_json(
        test_app(),
        "/v1/violations",
        json!({"plate_number": "KA01AB1234", "violation_type": "helmet"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "MISSING_BEARER_TOKEN");
}

#[tokio::test]
async fn gate_entries_resolve_access_at_insert_time() {
    let app = test_app();

    let (status, body) = post_authed(
        app.clone(),
        "/v1/gates",
        json!({"name": "North gate", "camera_id": "missing-camera"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "UNKNOWN_CAMERA");

    let (_, camera) = post_authed(
        app.clone(),
        "/v1/cameras",
        json!({"name": "North cam", "location": "Gate 1"}),
    )
    .await;
    let camera_id = camera["camera"]["id"].as_str().expect("camera id").to_string();
    let (status, gate) = post_authed(
        app.clone(),
        "/v1/gates",
        json!({"name": "North gate", "camera_id": camera_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let gate_id = gate["gate"]["id"].as_str().expect("gate id").to_string();

    let (_, unknown) = post_json(
        app.clone(),
        "/v1/gate-entries",
        json!({"gate_id": gate_id, "plate_number": "TN10XY0001"}),
    )
    .await;
    assert_eq!(unknown["entry"]["access_decision"], "flagged");

    post_authed(
        app.clone(),
        "/v1/vehicles",
        json!({"plate_number": "TN10XY0002", "owner_name": "Known Owner"}),
    )
    .await;
    let (_, known) = post_json(
        app.clone(),
        "/v1/gate-entries",
        json!({"gate_id": gate_id, "plate_number": "TN 10 XY 0002", "direction": "exit"}),
    )
    .await;
    assert_eq!(known["entry"]["access_decision"], "granted");
    assert_eq!(known["entry"]["direction"], "exit");

    let (status, _) = post_authed(
        app.clone(),
        "/v1/vehicles/TN10XY0002/blacklist",
        json!({"blacklisted": true, "reason": "stolen"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, denied) = post_json(
        app.clone(),
        "/v1/gate-entries",
        json!({"gate_id": gate_id, "plate_number": "TN10XY0002"}),
    )
    .await;
    assert_eq!(denied["entry"]["access_decision"], "denied");

    let (status, _) = post_json(
        app.clone(),
        "/v1/gate-entries",
        json!({"gate_id": "nope", "plate_number": "TN10XY0002"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, entries) = get_json(app.clone(), &format!("/v1/gate-entries?gate_id={gate_id}")).await;
    assert_eq!(entries["entries"].as_array().expect("entries").len(), 3);

    let (_, stats) = get_json(app, "/v1/dashboard/stats").await;
    assert_eq!(stats["stats"]["gate_entries"], 3);
    assert_eq!(stats["stats"]["denied_entries"], 1);
    assert_eq!(stats["stats"]["flagged_entries"], 1);
    assert_eq!(stats["stats"]["blacklisted_vehicles"], 1);
}

#[tokio::test]
async fn fine_schedule_upsert_applies_to_new_challans() {
    let app = test_app();
    let (_, before) = get_json(app.clone(), "/v1/fines?state=GA").await;
    assert!(before["fines"].as_array().expect("fines").is_empty());
    assert_eq!(before["default_fine_amount"], 500);

    let (status, upserted) = post_authed(
        app.clone(),
        "/v1/fines",
        json!({
            "state": "GA",
            "violation_type": "helmet",
            "fine_amount": 1500,
            "section_reference": "Section 194D MVA",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upserted["fine"]["state"], "Goa");

    let issued = issue_challan(app.clone(), "GA07K1234", "helmet_pillion", "Goa").await;
    assert_eq!(issued["fine_amount"], 1500);
    assert_eq!(issued["challan"]["violation_type"], "helmet");

    let (status, body) = post_authed(
        app,
        "/v1/fines",
        json!({"state": "GA", "violation_type": "helmet", "fine_amount": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_FINE_AMOUNT");
}

#[tokio::test]
async fn sms_in_demo_mode_marks_challan_sent() {
    let app = test_app();
    let issued = issue_challan(app.clone(), "AP16BZ3508", "helmet", "AP").await;
    let challan_id = issued["challan"]["id"].as_str().expect("id").to_string();

    let (status, body) = post_json(
        app.clone(),
        "/v1/send-challan-sms",
        json!({"challan_id": challan_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["mock"], true);
    assert_eq!(body["public_url"], issued["public_url"]);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains(issued["challan_number"].as_str().expect("number")));

    let (_, challan) = get_json(app.clone(), &format!("/v1/challans/{challan_id}")).await;
    assert_eq!(challan["challan"]["sms_sent"], true);
    assert_eq!(challan["challan"]["sms_mock"], true);

    let (status, _) = post_json(app, "/v1/send-challan-sms", json!({"challan_id": "missing"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configured_sms_without_recipient_is_rejected() {
    let mut config = test_config();
    config.msg91_auth_key = Some("msg91-key".to_string());
    config.msg91_template_id = Some("template-1".to_string());
    let app = build_router(AppState::new(config, None));

    let issued = issue_challan(app.clone(), "AP16BZ3508", "helmet", "AP").await;
    let challan_id = issued["challan"]["id"].as_str().expect("id").to_string();
    let (status, body) = post_json(
        app.clone(),
        "/v1/send-challan-sms",
        json!({"challan_id": challan_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "MISSING_RECIPIENT_PHONE");

    let (_, challan) = get_json(app, &format!("/v1/challans/{challan_id}")).await;
    assert_eq!(challan["challan"]["sms_sent"], false);
}

#[tokio::test]
async fn insert_events_reach_filtered_subscribers() {
    let state = AppState::new(test_config(), None);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handle = state.feed.on_insert(
        "challans",
        |event| event.record["state"] == "Andhra Pradesh",
        move |event| {
            sink.lock()
                .expect("lock")
                .push(event.record["challan_number"].to_string())
        },
    );
    let app = build_router(state);

    issue_challan(app.clone(), "AP16BZ3508", "helmet", "AP").await;
    issue_challan(app.clone(), "KA01AB1234", "helmet", "KA").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("ECH-AP-"));
}

#[tokio::test]
async fn health_reports_integrations_and_persistence() {
    let (status, body) = get_json(test_app(), "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["persistence"], false);
    assert_eq!(body["integrations"]["sms"], false);
    assert_eq!(body["integrations"]["payments"], false);
}
