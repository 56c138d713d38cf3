use async_trait::async_trait;
use evidence_workflow::backend::ChallanBackend;
use evidence_workflow::errors::WorkflowError;
use evidence_workflow::handler::{run_batch, BatchPlan, Workflow};
use evidence_workflow::models::{
    BatchItem, ChallanRequest, DetectionOutcome, IssuedChallan, LookupOutcome, MediaKind,
    NotificationOutcome, UploadedEvidence, ViolationSelection, WorkflowStep,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct FakeBackend {
    fail_detection: AtomicBool,
    fail_lookup: AtomicBool,
    empty_lookup: AtomicBool,
    fail_issue: AtomicBool,
    fail_sms: AtomicBool,
    uploads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    issued: Mutex<Vec<ChallanRequest>>,
}

impl FakeBackend {
    fn issued_requests(&self) -> Vec<ChallanRequest> {
        self.issued.lock().expect("issued lock").clone()
    }
}

fn backend_error(operation: &'static str) -> WorkflowError {
    WorkflowError::Backend {
        operation,
        status: 500,
        message: format!("{operation} unavailable"),
    }
}

#[async_trait]
impl ChallanBackend for FakeBackend {
    async fn upload_evidence(
        &self,
        file_name: &str,
        _bytes: &[u8],
    ) -> Result<UploadedEvidence, WorkflowError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedEvidence {
            queue_id: format!("queue-{n}"),
            public_url: format!("http://evidence.test/{file_name}"),
        })
    }

    async fn process_evidence(
        &self,
        evidence: &UploadedEvidence,
        _kind: MediaKind,
    ) -> Result<DetectionOutcome, WorkflowError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_detection.load(Ordering::SeqCst) || evidence.public_url.contains("broken") {
            return Err(backend_error("detection"));
        }
        Ok(DetectionOutcome {
            result: json!({
                "vehicles_detected": [{
                    "vehicle_type": "motorcycle",
                    "plate_number": "AP16BZ35O8",
                    "violations": ["helmet"],
                    "confidence": 0.91
                }],
                "scene_description": "junction",
                "total_vehicles": 1
            }),
            mock: false,
            processing_time_ms: 20,
        })
    }

    async fn lookup_vehicle(&self, plate_number: &str) -> Result<LookupOutcome, WorkflowError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(backend_error("lookup"));
        }
        let data = if self.empty_lookup.load(Ordering::SeqCst) {
            json!({ "registration_number": plate_number, "owner_name": "", "state": null })
        } else {
            json!({
                "registration_number": plate_number,
                "owner_name": "K Ramesh",
                "owner_mobile": "9876543210",
                "state": "Andhra Pradesh",
                "is_test_data": false
            })
        };
        Ok(LookupOutcome {
            data,
            mock: false,
            not_found: false,
            is_test_data: false,
        })
    }

    async fn create_challan(
        &self,
        request: &ChallanRequest,
    ) -> Result<IssuedChallan, WorkflowError> {
        if self.fail_issue.load(Ordering::SeqCst) {
            return Err(backend_error("create-challan"));
        }
        let mut issued = self.issued.lock().expect("issued lock");
        issued.push(request.clone());
        Ok(IssuedChallan {
            challan_id: format!("challan-{}", issued.len()),
            challan_number: format!("ECH-AP-TEST-{:04}", issued.len()),
            public_url: format!("https://echallan.test/challan/token-{}", issued.len()),
            fine_amount: request.custom_fine_amount.unwrap_or(1035),
        })
    }

    async fn send_sms(&self, _challan_id: &str) -> Result<NotificationOutcome, WorkflowError> {
        if self.fail_sms.load(Ordering::SeqCst) {
            return Err(backend_error("send-sms"));
        }
        Ok(NotificationOutcome { mock: true })
    }
}

fn helmet_in(state: &str) -> ViolationSelection {
    ViolationSelection {
        violation_type: "helmet".to_string(),
        violation_label: None,
        custom_fine_amount: None,
        state: state.to_string(),
    }
}

async fn looked_up_item(workflow: &mut Workflow<FakeBackend>) -> String {
    let id = workflow.add_item("frame.jpg", vec![0xFF, 0xD8, 0xFF]);
    workflow.detect(&id).await.expect("detect");
    workflow.lookup(&id).await.expect("lookup");
    id
}

#[tokio::test]
async fn corrected_plate_flows_into_issued_challan() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let id = workflow.add_item("frame.jpg", vec![1, 2, 3]);

    workflow.detect(&id).await.expect("detect");
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::Detected);
    assert_eq!(item.plate.as_deref(), Some("AP16BZ35O8"));
    assert!(item.detection_latency_ms.is_some());

    workflow.correct_plate(&id, "ap 16 bz 3508").expect("correct");
    workflow.lookup(&id).await.expect("lookup");
    workflow
        .select_violation(&id, helmet_in("Andhra Pradesh"))
        .expect("select");
    let issued = workflow.issue(&id).await.expect("issue");
    assert_eq!(issued.fine_amount, 1035);

    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::Done);
    assert_eq!(item.original_plate.as_deref(), Some("AP16BZ35O8"));
    assert_eq!(item.plate.as_deref(), Some("AP16BZ3508"));
    assert_eq!(item.corrections.len(), 1);
    assert_eq!(item.notification.as_ref().map(|n| n.mock), Some(true));

    let requests = workflow.backend().issued_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.plate_number, "AP16BZ3508");
    assert_eq!(request.image_url.as_deref(), Some("http://evidence.test/frame.jpg"));
    assert_eq!(request.ai_detection_data["original_plate"], "AP16BZ35O8");
    assert_eq!(request.ai_detection_data["final_plate"], "AP16BZ3508");
    let corrections = request.ai_detection_data["plate_corrections"]
        .as_array()
        .expect("corrections array");
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0]["original"], "AP16BZ35O8");
    assert_eq!(corrections[0]["corrected"], "AP16BZ3508");
    assert_eq!(
        request.ai_detection_data["result"]["vehicles_detected"][0]["violations"][0],
        "helmet"
    );
    assert_eq!(request.vehicle_data["owner_name"], "K Ramesh");
}

#[tokio::test]
async fn repeated_corrections_are_all_kept() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let id = workflow.add_item("frame.jpg", vec![1]);
    workflow.detect(&id).await.expect("detect");

    workflow.correct_plate(&id, "AP16BZ3500").expect("first");
    workflow.correct_plate(&id, "AP16BZ3508").expect("second");
    workflow.correct_plate(&id, "AP16BZ3508").expect("unchanged");

    let item = workflow.item(&id).expect("item");
    assert_eq!(item.corrections.len(), 2);
    assert_eq!(item.corrections[1].original, "AP16BZ3500");
    assert_eq!(item.original_plate.as_deref(), Some("AP16BZ35O8"));

    let blank = workflow.correct_plate(&id, "  ");
    assert!(matches!(blank, Err(WorkflowError::InvalidRequest(_))));
}

#[tokio::test]
async fn corrections_outside_the_plate_alphabet_are_rejected() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let id = workflow.add_item("frame.jpg", vec![1]);
    workflow.detect(&id).await.expect("detect");

    for bad in ["AP.16BZ3508", "AP16/BZ3508", "AP16BZ3508!", "AP16BZ3508AP16BZ3508X"] {
        let result = workflow.correct_plate(&id, bad);
        assert!(
            matches!(result, Err(WorkflowError::InvalidRequest(_))),
            "{bad} should be rejected"
        );
    }
    let item = workflow.item(&id).expect("item");
    assert!(item.corrections.is_empty());
    assert_eq!(item.plate.as_deref(), Some("AP16BZ35O8"));

    workflow
        .correct_plate(&id, "ap-16 bz 3508")
        .expect("spaced and hyphenated plate is accepted");
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.plate.as_deref(), Some("AP16BZ3508"));
    assert_eq!(item.corrections.len(), 1);
}

#[tokio::test]
async fn failed_detection_returns_item_to_upload_and_can_retry() {
    let mut workflow = Workflow::new(FakeBackend::default());
    workflow.backend().fail_detection.store(true, Ordering::SeqCst);
    let id = workflow.add_item("frame.jpg", vec![1]);

    let err = workflow.detect(&id).await;
    assert!(matches!(err, Err(WorkflowError::Backend { .. })));
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::Upload);
    assert!(item.last_error.is_some());
    assert!(item.uploaded.is_some());

    workflow.backend().fail_detection.store(false, Ordering::SeqCst);
    workflow.detect(&id).await.expect("retry");
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::Detected);
    assert!(item.last_error.is_none());
    assert_eq!(workflow.backend().uploads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn actions_out_of_order_leave_item_unchanged() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let id = workflow.add_item("frame.jpg", vec![1]);

    let err = workflow.lookup(&id).await;
    assert!(matches!(
        err,
        Err(WorkflowError::InvalidTransition {
            step: WorkflowStep::Upload,
            ..
        })
    ));
    let err = workflow.issue(&id).await;
    assert!(matches!(err, Err(WorkflowError::InvalidTransition { .. })));
    assert_eq!(workflow.item(&id).expect("item").step, WorkflowStep::Upload);

    workflow.detect(&id).await.expect("detect");
    workflow.lookup(&id).await.expect("lookup");
    let err = workflow.issue(&id).await;
    assert!(matches!(err, Err(WorkflowError::MissingSelection { .. })));
    let err = workflow.correct_plate(&id, "TS09AB1234");
    assert!(matches!(err, Err(WorkflowError::InvalidTransition { .. })));

    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::LookedUp);
    assert!(item.corrections.is_empty());

    let unknown = workflow.detect("missing").await;
    assert!(matches!(unknown, Err(WorkflowError::UnknownItem(_))));
}

#[tokio::test]
async fn lookup_falls_back_to_tagged_test_data() {
    let mut workflow = Workflow::new(FakeBackend::default());
    workflow.backend().fail_lookup.store(true, Ordering::SeqCst);
    let id = looked_up_item(&mut workflow).await;
    let lookup = workflow
        .item(&id)
        .and_then(|item| item.lookup.clone())
        .expect("lookup stored");
    assert!(lookup.is_test_data);
    assert!(lookup.mock);
    assert_eq!(lookup.data["is_test_data"], true);
    assert_eq!(lookup.data["registration_number"], "AP16BZ35O8");

    let mut workflow = Workflow::new(FakeBackend::default());
    workflow.backend().empty_lookup.store(true, Ordering::SeqCst);
    let id = looked_up_item(&mut workflow).await;
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::LookedUp);
    assert!(item.lookup.as_ref().is_some_and(|l| l.is_test_data));
}

#[tokio::test]
async fn failed_issuance_keeps_lookup_and_allows_retry() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let id = looked_up_item(&mut workflow).await;
    workflow
        .select_violation(&id, helmet_in("AP"))
        .expect("select");

    workflow.backend().fail_issue.store(true, Ordering::SeqCst);
    let err = workflow.issue(&id).await;
    assert!(err.is_err());
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::LookedUp);
    assert!(item.lookup.is_some());
    assert!(item.challan.is_none());
    assert!(item.last_error.is_some());

    workflow.backend().fail_issue.store(false, Ordering::SeqCst);
    let issued = workflow.issue(&id).await.expect("retry");
    assert_eq!(issued.challan_number, "ECH-AP-TEST-0001");
    assert_eq!(workflow.item(&id).expect("item").step, WorkflowStep::Done);
}

#[tokio::test]
async fn sms_failure_does_not_undo_done() {
    let mut workflow = Workflow::new(FakeBackend::default());
    workflow.backend().fail_sms.store(true, Ordering::SeqCst);
    let id = looked_up_item(&mut workflow).await;
    workflow
        .select_violation(
            &id,
            ViolationSelection {
                violation_type: "other".to_string(),
                violation_label: Some("Tinted glass".to_string()),
                custom_fine_amount: Some(750),
                state: "AP".to_string(),
            },
        )
        .expect("select");

    let issued = workflow.issue(&id).await.expect("issue");
    assert_eq!(issued.fine_amount, 750);
    let item = workflow.item(&id).expect("item");
    assert_eq!(item.step, WorkflowStep::Done);
    assert!(item.notification.is_none());
    assert!(item
        .notification_error
        .as_deref()
        .is_some_and(|e| e.contains("send-sms")));
}

#[tokio::test]
async fn detect_all_runs_pending_items_together() {
    let mut workflow = Workflow::new(FakeBackend::default());
    for n in 0..3 {
        workflow.add_item(format!("frame-{n}.jpg"), vec![n]);
    }
    let results = workflow.detect_all().await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(workflow.backend().max_in_flight.load(Ordering::SeqCst), 3);
    assert!(workflow
        .items()
        .iter()
        .all(|item| item.step == WorkflowStep::Detected));

    assert!(workflow.detect_all().await.is_empty());
}

#[tokio::test]
async fn batch_isolates_failing_items() {
    let mut workflow = Workflow::new(FakeBackend::default());
    let good = workflow.add_item("good.jpg", vec![1]);
    let bad = workflow.add_item("broken.mp4", vec![2]);
    let plan = |item_id: &str, path: &str, correction: Option<&str>| BatchPlan {
        item_id: item_id.to_string(),
        entry: BatchItem {
            path: path.to_string(),
            plate_correction: correction.map(str::to_string),
            violation_type: None,
            violation_label: None,
            custom_fine_amount: None,
            state: None,
        },
    };
    let plans = vec![
        plan(&good, "/evidence/good.jpg", Some("AP16BZ3508")),
        plan(&bad, "/evidence/broken.mp4", None),
    ];

    let reports = run_batch(&mut workflow, &plans, None).await;
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].step, WorkflowStep::Done);
    assert_eq!(reports[0].plate.as_deref(), Some("AP16BZ3508"));
    assert_eq!(reports[0].corrections, 1);
    assert!(reports[0].challan_number.is_some());
    assert!(reports[0].error.is_none());

    assert_eq!(reports[1].step, WorkflowStep::Upload);
    assert!(reports[1].challan_number.is_none());
    assert!(reports[1].error.is_some());

    let requests = workflow.backend().issued_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].violation_type, "helmet");
    assert_eq!(requests[0].state, "Andhra Pradesh");
    assert_eq!(requests[0].vehicle_data["state"], Value::from("Andhra Pradesh"));
}
