use crate::backend::ChallanBackend;
use crate::errors::WorkflowError;
use crate::models::{
    is_empty_record, BatchItem, ChallanRequest, DetectionOutcome, EvidenceItem, IssuedChallan,
    ItemReport, LookupOutcome, MediaKind, PlateCorrection, ViolationSelection, WorkflowStep,
};
use futures::future::join_all;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};

const MAX_PLATE_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartDetection,
    DetectionSucceeded,
    DetectionFailed,
    CorrectPlate,
    StartLookup,
    LookupFinished,
    SelectViolation,
    StartIssue,
    IssueSucceeded,
    IssueFailed,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Self::StartDetection => "start detection",
            Self::DetectionSucceeded => "finish detection",
            Self::DetectionFailed => "fail detection",
            Self::CorrectPlate => "correct plate",
            Self::StartLookup => "start lookup",
            Self::LookupFinished => "finish lookup",
            Self::SelectViolation => "select violation",
            Self::StartIssue => "issue challan",
            Self::IssueSucceeded => "finish issuance",
            Self::IssueFailed => "fail issuance",
        }
    }
}

/// Next step for `action` taken in `step`, or `None` when the action is not allowed there.
pub fn transition(step: WorkflowStep, action: Action) -> Option<WorkflowStep> {
    use Action::*;
    use WorkflowStep::*;
    match (step, action) {
        (Upload, StartDetection) => Some(Detecting),
        (Detecting, DetectionSucceeded) => Some(Detected),
        (Detecting, DetectionFailed) => Some(Upload),
        (Detected, CorrectPlate) => Some(Detected),
        (Detected, StartLookup) => Some(Lookup),
        (Lookup, LookupFinished) => Some(LookedUp),
        (LookedUp, SelectViolation) => Some(LookedUp),
        (LookedUp, StartIssue) => Some(Challan),
        (Challan, IssueSucceeded) => Some(Done),
        (Challan, IssueFailed) => Some(LookedUp),
        _ => None,
    }
}

fn advance(item: &EvidenceItem, action: Action) -> Result<WorkflowStep, WorkflowError> {
    transition(item.step, action).ok_or_else(|| WorkflowError::InvalidTransition {
        item_id: item.id.clone(),
        step: item.step,
        action: action.label(),
    })
}

pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub struct Workflow<B> {
    backend: B,
    items: Vec<EvidenceItem>,
}

impl<B: ChallanBackend> Workflow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            items: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn add_item(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.items
            .push(EvidenceItem::new(id.clone(), file_name.into(), bytes));
        id
    }

    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&EvidenceItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut EvidenceItem, WorkflowError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WorkflowError::UnknownItem(id.to_string()))
    }

    pub async fn detect(&mut self, id: &str) -> Result<(), WorkflowError> {
        let backend = &self.backend;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WorkflowError::UnknownItem(id.to_string()))?;
        run_detection(backend, item).await
    }

    /// Starts detection for every item still in `upload`, all at once.
    pub async fn detect_all(&mut self) -> Vec<(String, Result<(), WorkflowError>)> {
        let backend = &self.backend;
        let runs = self
            .items
            .iter_mut()
            .filter(|item| item.step == WorkflowStep::Upload)
            .map(|item| async move {
                let id = item.id.clone();
                let result = run_detection(backend, item).await;
                (id, result)
            });
        join_all(runs).await
    }

    pub fn correct_plate(&mut self, id: &str, corrected: &str) -> Result<(), WorkflowError> {
        let item = self.item_mut(id)?;
        advance(item, Action::CorrectPlate)?;
        if corrected
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '-' && !c.is_whitespace())
        {
            return Err(WorkflowError::InvalidRequest(format!(
                "corrected plate {corrected:?} may only hold letters, digits, spaces and hyphens"
            )));
        }
        let corrected = normalize_plate(corrected);
        if corrected.is_empty() || corrected.len() > MAX_PLATE_LEN {
            return Err(WorkflowError::InvalidRequest(format!(
                "corrected plate must be 1-{MAX_PLATE_LEN} characters"
            )));
        }
        let original = item.plate.clone().unwrap_or_default();
        if original == corrected {
            return Ok(());
        }
        item.corrections.push(PlateCorrection {
            original,
            corrected: corrected.clone(),
            corrected_at: chrono::Utc::now().timestamp_millis(),
        });
        item.plate = Some(corrected);
        Ok(())
    }

    /// Looks the current plate up. Upstream failures and empty records fall back to tagged test data.
    pub async fn lookup(&mut self, id: &str) -> Result<&LookupOutcome, WorkflowError> {
        let backend = &self.backend;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WorkflowError::UnknownItem(id.to_string()))?;
        let next = advance(item, Action::StartLookup)?;
        let plate = item
            .plate
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| WorkflowError::MissingPlate {
                item_id: item.id.clone(),
            })?;
        item.step = next;

        let outcome = match backend.lookup_vehicle(&plate).await {
            Ok(outcome) if !is_empty_record(&outcome.data) => outcome,
            Ok(_) => {
                warn!(item_id = %item.id, plate = %plate, "registry returned an empty record; using test data");
                LookupOutcome::synthetic(&plate)
            }
            Err(err) => {
                warn!(item_id = %item.id, plate = %plate, error = %err, "vehicle lookup failed; using test data");
                LookupOutcome::synthetic(&plate)
            }
        };
        item.step = advance(item, Action::LookupFinished)?;
        Ok(item.lookup.insert(outcome))
    }

    pub fn select_violation(
        &mut self,
        id: &str,
        selection: ViolationSelection,
    ) -> Result<(), WorkflowError> {
        let item = self.item_mut(id)?;
        advance(item, Action::SelectViolation)?;
        validate_selection(&selection)?;
        item.selection = Some(selection);
        Ok(())
    }

    /// Issues the challan for a looked-up item, then dispatches the SMS.
    pub async fn issue(&mut self, id: &str) -> Result<IssuedChallan, WorkflowError> {
        let backend = &self.backend;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WorkflowError::UnknownItem(id.to_string()))?;
        let next = advance(item, Action::StartIssue)?;
        let request = challan_request(item)?;
        item.step = next;

        let issued = match backend.create_challan(&request).await {
            Ok(issued) => issued,
            Err(err) => {
                warn!(item_id = %item.id, error = %err, "challan issuance failed");
                item.step = advance(item, Action::IssueFailed)?;
                item.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        item.step = advance(item, Action::IssueSucceeded)?;
        item.last_error = None;
        item.challan = Some(issued.clone());
        info!(item_id = %item.id, challan_number = %issued.challan_number, "challan issued");

        match backend.send_sms(&issued.challan_id).await {
            Ok(outcome) => item.notification = Some(outcome),
            Err(err) => {
                warn!(item_id = %item.id, error = %err, "challan sms failed");
                item.notification_error = Some(err.to_string());
            }
        }
        Ok(issued)
    }
}

async fn run_detection<B: ChallanBackend>(
    backend: &B,
    item: &mut EvidenceItem,
) -> Result<(), WorkflowError> {
    item.step = advance(item, Action::StartDetection)?;
    item.last_error = None;
    let started = Instant::now();

    match upload_and_detect(backend, item).await {
        Ok(outcome) => {
            item.detection_latency_ms = Some(started.elapsed().as_millis() as u64);
            item.original_plate = outcome.primary_plate().map(|p| normalize_plate(&p));
            item.plate = item.original_plate.clone();
            item.detection = Some(outcome);
            item.step = advance(item, Action::DetectionSucceeded)?;
            info!(item_id = %item.id, plate = ?item.plate, "detection finished");
            Ok(())
        }
        Err(err) => {
            warn!(item_id = %item.id, error = %err, "detection failed; item back to upload");
            item.step = advance(item, Action::DetectionFailed)?;
            item.last_error = Some(err.to_string());
            Err(err)
        }
    }
}

async fn upload_and_detect<B: ChallanBackend>(
    backend: &B,
    item: &mut EvidenceItem,
) -> Result<DetectionOutcome, WorkflowError> {
    let uploaded = match &item.uploaded {
        Some(uploaded) => uploaded.clone(),
        None => {
            let uploaded = backend.upload_evidence(&item.file_name, &item.bytes).await?;
            item.uploaded = Some(uploaded.clone());
            uploaded
        }
    };
    backend.process_evidence(&uploaded, item.media_kind).await
}

fn validate_selection(selection: &ViolationSelection) -> Result<(), WorkflowError> {
    if selection.violation_type.trim().is_empty() {
        return Err(WorkflowError::InvalidRequest(
            "violation_type is required".to_string(),
        ));
    }
    if selection.state.trim().is_empty() {
        return Err(WorkflowError::InvalidRequest("state is required".to_string()));
    }
    if let Some(amount) = selection.custom_fine_amount {
        if amount <= 0 {
            return Err(WorkflowError::InvalidRequest(
                "custom_fine_amount must be positive".to_string(),
            ));
        }
    }
    if selection.violation_type.eq_ignore_ascii_case("other") {
        let labelled = selection
            .violation_label
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());
        if !labelled || selection.custom_fine_amount.is_none() {
            return Err(WorkflowError::InvalidRequest(
                "violation type other needs a label and a custom fine".to_string(),
            ));
        }
    }
    Ok(())
}

fn challan_request(item: &EvidenceItem) -> Result<ChallanRequest, WorkflowError> {
    let selection = item
        .selection
        .as_ref()
        .ok_or_else(|| WorkflowError::MissingSelection {
            item_id: item.id.clone(),
        })?;
    let plate = item.plate.clone().ok_or_else(|| WorkflowError::MissingPlate {
        item_id: item.id.clone(),
    })?;
    let public_url = item.uploaded.as_ref().map(|u| u.public_url.clone());
    let (image_url, video_url) = match item.media_kind {
        MediaKind::Image => (public_url.clone(), None),
        MediaKind::Video => (None, public_url.clone()),
    };
    let detection = item.detection.as_ref();

    Ok(ChallanRequest {
        plate_number: plate.clone(),
        violation_type: selection.violation_type.clone(),
        state: selection.state.clone(),
        violation_label: selection.violation_label.clone(),
        image_url,
        video_url,
        evidence_urls: public_url.into_iter().collect(),
        vehicle_data: item
            .lookup
            .as_ref()
            .map(|l| l.data.clone())
            .unwrap_or_default(),
        ai_detection_data: json!({
            "result": detection.map(|d| d.result.clone()),
            "mock": detection.map(|d| d.mock),
            "latency_ms": item.detection_latency_ms,
            "original_plate": item.original_plate,
            "final_plate": plate,
            "plate_corrections": item.corrections,
        }),
        custom_fine_amount: selection.custom_fine_amount,
    })
}

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub item_id: String,
    pub entry: BatchItem,
}

/// Detects every planned item concurrently, then looks up and issues each one in turn.
pub async fn run_batch<B: ChallanBackend>(
    workflow: &mut Workflow<B>,
    plans: &[BatchPlan],
    default_state: Option<&str>,
) -> Vec<ItemReport> {
    workflow.detect_all().await;

    let mut reports = Vec::with_capacity(plans.len());
    for plan in plans {
        let error = process_planned(workflow, plan, default_state)
            .await
            .err()
            .map(|e| e.to_string());
        if let Some(item) = workflow.item(&plan.item_id) {
            reports.push(item_report(&plan.entry.path, item, error));
        }
    }
    reports
}

async fn process_planned<B: ChallanBackend>(
    workflow: &mut Workflow<B>,
    plan: &BatchPlan,
    default_state: Option<&str>,
) -> Result<(), WorkflowError> {
    let item = workflow
        .item(&plan.item_id)
        .ok_or_else(|| WorkflowError::UnknownItem(plan.item_id.clone()))?;
    if item.step != WorkflowStep::Detected {
        let reason = item
            .last_error
            .clone()
            .unwrap_or_else(|| format!("item stopped at {}", item.step));
        return Err(WorkflowError::InvalidRequest(reason));
    }
    let detected_violation = item.detection.as_ref().and_then(DetectionOutcome::primary_violation);

    if let Some(corrected) = &plan.entry.plate_correction {
        workflow.correct_plate(&plan.item_id, corrected)?;
    }
    let registry_state = workflow.lookup(&plan.item_id).await?.registry_state();

    let violation_type = plan
        .entry
        .violation_type
        .clone()
        .or(detected_violation)
        .ok_or_else(|| WorkflowError::MissingSelection {
            item_id: plan.item_id.clone(),
        })?;
    let state = plan
        .entry
        .state
        .clone()
        .or_else(|| default_state.map(str::to_string))
        .or(registry_state)
        .ok_or_else(|| {
            WorkflowError::InvalidRequest(format!("no jurisdiction for {}", plan.entry.path))
        })?;
    workflow.select_violation(
        &plan.item_id,
        ViolationSelection {
            violation_type,
            violation_label: plan.entry.violation_label.clone(),
            custom_fine_amount: plan.entry.custom_fine_amount,
            state,
        },
    )?;
    workflow.issue(&plan.item_id).await?;
    Ok(())
}

pub fn item_report(path: &str, item: &EvidenceItem, error: Option<String>) -> ItemReport {
    ItemReport {
        path: path.to_string(),
        step: item.step,
        plate: item.plate.clone(),
        corrections: item.corrections.len(),
        mock_detection: item.detection.as_ref().map(|d| d.mock),
        test_data_lookup: item.lookup.as_ref().map(|l| l.is_test_data),
        challan_number: item.challan.as_ref().map(|c| c.challan_number.clone()),
        public_url: item.challan.as_ref().map(|c| c.public_url.clone()),
        fine_amount: item.challan.as_ref().map(|c| c.fine_amount),
        notification_error: item.notification_error.clone(),
        error: error.or_else(|| item.last_error.clone()),
    }
}

pub fn unreadable_report(path: &str, reason: String) -> ItemReport {
    ItemReport {
        path: path.to_string(),
        step: WorkflowStep::Upload,
        plate: None,
        corrections: 0,
        mock_detection: None,
        test_data_lookup: None,
        challan_number: None,
        public_url: None,
        fine_amount: None,
        notification_error: None,
        error: Some(reason),
    }
}
