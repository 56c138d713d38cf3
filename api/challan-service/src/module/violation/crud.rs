use super::model::{Severity, ViolationRecord, ViolationType};
use super::schema::{
    CreateViolationRequest, ResolveViolationRequest, ViolationListQuery, ViolationListResponse,
    ViolationResponse,
};
use crate::app::AppState;
use crate::infra::VIOLATIONS_COLLECTION;
use crate::module::error::AppError;
use crate::module::fine::crud::resolve_fine;
use crate::module::vehicle::crud::{observe_vehicle, publish_vehicle, VehicleObservation};
use crate::service::auth_service::authorize_operator;
use crate::service::jurisdiction_service::{normalize_plate, plate_state_code};
use crate::service::validation_service::{non_blank, validate_plate};
use crate::store::{lock_store, now_unix, persist_record, StoreInner};
use axum::http::HeaderMap;
use tracing::info;
use uuid::Uuid;

/// Everything needed to open a violation row for a plate.
#[derive(Debug, Clone)]
pub struct NewViolation {
    pub plate_number: String,
    pub vehicle_id: Option<String>,
    pub violation_type: ViolationType,
    pub severity: Option<Severity>,
    pub state: Option<String>,
    pub fine_amount: Option<i64>,
    pub camera_id: Option<String>,
    pub evidence_id: Option<String>,
    pub evidence_url: Option<String>,
    pub confidence: Option<f64>,
}

pub async fn list_violations(
    state: &AppState,
    query: ViolationListQuery,
) -> Result<ViolationListResponse, AppError> {
    let plate = query.plate_number.as_deref().map(normalize_plate);
    let store = lock_store(&state.store)?;
    let mut violations: Vec<ViolationRecord> = store
        .violations_by_id
        .values()
        .filter(|v| query.resolved.map_or(true, |r| v.is_resolved == r))
        .filter(|v| plate.as_deref().map_or(true, |p| v.plate_number == p))
        .cloned()
        .collect();
    violations.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
    Ok(ViolationListResponse {
        success: true,
        violations,
    })
}

pub async fn create_violation(
    state: &AppState,
    headers: &HeaderMap,
    req: CreateViolationRequest,
) -> Result<ViolationResponse, AppError> {
    authorize_operator(&state.integrations.operator_auth, headers)?;
    validate_plate(&req.plate_number)?;
    let violation_type = parse_violation_type(&req.violation_type)?;
    let severity = match non_blank(req.severity.as_deref()) {
        Some(raw) => Some(parse_severity(raw)?),
        None => None,
    };
    if req.fine_amount.is_some_and(|f| f <= 0) {
        return Err(AppError::bad_request(
            "INVALID_FINE_AMOUNT",
            "fine_amount must be positive",
        ));
    }
    if let Some(camera_id) = non_blank(req.camera_id.as_deref()) {
        let store = lock_store(&state.store)?;
        if !store.cameras_by_id.contains_key(camera_id) {
            return Err(AppError::bad_request(
                "UNKNOWN_CAMERA",
                format!("camera {camera_id} does not exist"),
            ));
        }
    }

    let plate = normalize_plate(&req.plate_number);
    let now = now_unix();
    let (vehicle, created, violation) = {
        let mut store = lock_store(&state.store)?;
        let (vehicle, created) =
            observe_vehicle(&mut store, &plate, VehicleObservation::default(), now);
        let violation = record_violation(
            &mut store,
            NewViolation {
                plate_number: plate.clone(),
                vehicle_id: Some(vehicle.id.clone()),
                violation_type,
                severity,
                state: req.state,
                fine_amount: req.fine_amount,
                camera_id: req.camera_id,
                evidence_id: req.evidence_id,
                evidence_url: req.evidence_url,
                confidence: req.confidence,
            },
            state.config.default_fine_amount,
            now,
        );
        (vehicle, created, violation)
    };

    publish_vehicle(state, &vehicle, created).await;
    publish_violation(state, &violation).await;
    info!(
        violation_id = %violation.id,
        plate = %violation.plate_number,
        violation_type = violation.violation_type.as_str(),
        "violation recorded"
    );
    Ok(ViolationResponse {
        success: true,
        violation,
    })
}

/// Terminal transition. A second resolve is a conflict and changes nothing.
pub async fn resolve_violation(
    state: &AppState,
    headers: &HeaderMap,
    violation_id: &str,
    req: ResolveViolationRequest,
) -> Result<ViolationResponse, AppError> {
    let operator = authorize_operator(&state.integrations.operator_auth, headers)?;
    let violation = {
        let mut store = lock_store(&state.store)?;
        let violation = store.violations_by_id.get_mut(violation_id).ok_or_else(|| {
            AppError::not_found(
                "VIOLATION_NOT_FOUND",
                format!("no violation with id {violation_id}"),
            )
        })?;
        if violation.is_resolved {
            return Err(AppError::conflict(
                "VIOLATION_ALREADY_RESOLVED",
                format!("violation {violation_id} is already resolved"),
            ));
        }
        violation.is_resolved = true;
        violation.resolved_at = Some(now_unix());
        violation.resolved_by = Some(
            non_blank(req.resolved_by.as_deref())
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| operator.clone()),
        );
        violation.resolution_notes = req.notes;
        violation.clone()
    };

    persist_record(state, VIOLATIONS_COLLECTION, &violation.id, &violation).await;
    state.feed.publish_update(VIOLATIONS_COLLECTION, &violation);
    info!(violation_id = %violation.id, operator = %operator, "violation resolved");
    Ok(ViolationResponse {
        success: true,
        violation,
    })
}

/// Inserts an unresolved violation. The fine comes from the schedule for the
/// jurisdiction (given, or derived from the plate prefix) unless supplied.
pub fn record_violation(
    store: &mut StoreInner,
    new: NewViolation,
    default_fine: i64,
    now: i64,
) -> ViolationRecord {
    let violation_type = new.violation_type.stored();
    let jurisdiction = new
        .state
        .filter(|s| !s.trim().is_empty())
        .or_else(|| plate_state_code(&new.plate_number).map(ToOwned::to_owned))
        .unwrap_or_default();
    let fine = resolve_fine(
        store,
        &jurisdiction,
        violation_type,
        new.fine_amount,
        default_fine,
    );

    let violation = ViolationRecord {
        id: Uuid::new_v4().to_string(),
        vehicle_id: new.vehicle_id,
        plate_number: new.plate_number,
        camera_id: new.camera_id,
        evidence_id: new.evidence_id,
        evidence_url: new.evidence_url,
        violation_type,
        severity: new
            .severity
            .unwrap_or_else(|| new.violation_type.default_severity()),
        fine_amount: fine.amount,
        confidence: new.confidence,
        is_resolved: false,
        resolved_at: None,
        resolved_by: None,
        resolution_notes: None,
        detected_at: now,
    };
    store
        .violations_by_id
        .insert(violation.id.clone(), violation.clone());
    violation
}

pub async fn publish_violation(state: &AppState, violation: &ViolationRecord) {
    persist_record(state, VIOLATIONS_COLLECTION, &violation.id, violation).await;
    state.feed.publish_insert(VIOLATIONS_COLLECTION, violation);
}

pub fn parse_violation_type(raw: &str) -> Result<ViolationType, AppError> {
    ViolationType::parse(raw).ok_or_else(|| {
        AppError::bad_request(
            "INVALID_VIOLATION_TYPE",
            format!("unknown violation type `{raw}`"),
        )
    })
}

pub fn parse_severity(raw: &str) -> Result<Severity, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => Err(AppError::bad_request(
            "INVALID_SEVERITY",
            format!("unknown severity `{other}`"),
        )),
    }
}
