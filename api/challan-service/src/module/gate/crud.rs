use super::model::{AccessDecision, CameraRecord, EntryDirection, GateEntryRecord, GateRecord};
use super::schema::{
    CameraListResponse, CameraResponse, CreateCameraRequest, CreateGateEntryRequest,
    CreateGateRequest, GateEntryListQuery, GateEntryListResponse, GateEntryResponse,
    GateListResponse, GateResponse,
};
use crate::app::AppState;
use crate::infra::{CAMERAS_COLLECTION, GATES_COLLECTION, GATE_ENTRIES_COLLECTION};
use crate::module::error::AppError;
use crate::module::vehicle::model::VehicleRecord;
use crate::service::auth_service::authorize_operator;
use crate::service::jurisdiction_service::normalize_plate;
use crate::service::validation_service::{non_blank, validate_plate};
use crate::store::{lock_store, now_unix, persist_record};
use axum::http::HeaderMap;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_ENTRY_LIMIT: usize = 100;

pub async fn list_cameras(state: &AppState) -> Result<CameraListResponse, AppError> {
    let store = lock_store(&state.store)?;
    let mut cameras: Vec<CameraRecord> = store.cameras_by_id.values().cloned().collect();
    cameras.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(CameraListResponse {
        success: true,
        cameras,
    })
}

pub async fn create_camera(
    state: &AppState,
    headers: &HeaderMap,
    req: CreateCameraRequest,
) -> Result<CameraResponse, AppError> {
    authorize_operator(&state.integrations.operator_auth, headers)?;
    let name = required_name(&req.name)?;
    let camera = CameraRecord {
        id: Uuid::new_v4().to_string(),
        name,
        location: req.location,
        stream_url: req.stream_url,
        is_active: req.is_active.unwrap_or(true),
        created_at: now_unix(),
    };
    {
        let mut store = lock_store(&state.store)?;
        store
            .cameras_by_id
            .insert(camera.id.clone(), camera.clone());
    }
    persist_record(state, CAMERAS_COLLECTION, &camera.id, &camera).await;
    state.feed.publish_insert(CAMERAS_COLLECTION, &camera);
    info!(camera_id = %camera.id, name = %camera.name, "camera registered");
    Ok(CameraResponse {
        success: true,
        camera,
    })
}

pub async fn list_gates(state: &AppState) -> Result<GateListResponse, AppError> {
    let store = lock_store(&state.store)?;
    let mut gates: Vec<GateRecord> = store.gates_by_id.values().cloned().collect();
    gates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(GateListResponse {
        success: true,
        gates,
    })
}

pub async fn create_gate(
    state: &AppState,
    headers: &HeaderMap,
    req: CreateGateRequest,
) -> Result<GateResponse, AppError> {
    authorize_operator(&state.integrations.operator_auth, headers)?;
    let name = required_name(&req.name)?;
    let camera_id = non_blank(req.camera_id.as_deref()).map(ToOwned::to_owned);

    let gate = {
        let mut store = lock_store(&state.store)?;
        if let Some(camera_id) = &camera_id {
            if !store.cameras_by_id.contains_key(camera_id) {
                return Err(AppError::bad_request(
                    "UNKNOWN_CAMERA",
                    format!("camera {camera_id} does not exist"),
                ));
            }
        }
        let gate = GateRecord {
            id: Uuid::new_v4().to_string(),
            name,
            location: req.location,
            camera_id,
            is_active: req.is_active.unwrap_or(true),
            created_at: now_unix(),
        };
        store.gates_by_id.insert(gate.id.clone(), gate.clone());
        gate
    };
    persist_record(state, GATES_COLLECTION, &gate.id, &gate).await;
    state.feed.publish_insert(GATES_COLLECTION, &gate);
    info!(gate_id = %gate.id, name = %gate.name, "gate registered");
    Ok(GateResponse {
        success: true,
        gate,
    })
}

pub async fn list_gate_entries(
    state: &AppState,
    query: GateEntryListQuery,
) -> Result<GateEntryListResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ENTRY_LIMIT);
    let store = lock_store(&state.store)?;
    let entries: Vec<GateEntryRecord> = store
        .gate_entries
        .iter()
        .rev()
        .filter(|e| query.gate_id.as_deref().map_or(true, |g| e.gate_id == g))
        .take(limit)
        .cloned()
        .collect();
    Ok(GateEntryListResponse {
        success: true,
        entries,
    })
}

/// The access decision is fixed when the entry is written.
pub async fn record_gate_entry(
    state: &AppState,
    req: CreateGateEntryRequest,
) -> Result<GateEntryResponse, AppError> {
    validate_plate(&req.plate_number)?;
    let direction = parse_direction(req.direction.as_deref())?;
    let plate = normalize_plate(&req.plate_number);

    let entry = {
        let mut store = lock_store(&state.store)?;
        let gate = store.gates_by_id.get(&req.gate_id).ok_or_else(|| {
            AppError::not_found("GATE_NOT_FOUND", format!("no gate with id {}", req.gate_id))
        })?;
        if !gate.is_active {
            return Err(AppError::bad_request(
                "GATE_INACTIVE",
                format!("gate {} is not active", gate.id),
            ));
        }
        let vehicle = store.vehicles_by_plate.get(&plate);
        let (access_decision, decision_reason) = access_decision_for(vehicle);
        let entry = GateEntryRecord {
            id: Uuid::new_v4().to_string(),
            gate_id: req.gate_id.clone(),
            plate_number: plate.clone(),
            vehicle_id: vehicle.map(|v| v.id.clone()),
            direction,
            access_decision,
            decision_reason: decision_reason.to_string(),
            recorded_at: now_unix(),
        };
        store.gate_entries.push(entry.clone());
        entry
    };

    persist_record(state, GATE_ENTRIES_COLLECTION, &entry.id, &entry).await;
    state.feed.publish_insert(GATE_ENTRIES_COLLECTION, &entry);
    if entry.access_decision == AccessDecision::Granted {
        info!(gate_id = %entry.gate_id, plate = %entry.plate_number, "gate access granted");
    } else {
        warn!(
            gate_id = %entry.gate_id,
            plate = %entry.plate_number,
            reason = %entry.decision_reason,
            "gate access not granted"
        );
    }
    Ok(GateEntryResponse {
        success: true,
        entry,
    })
}

pub fn access_decision_for(vehicle: Option<&VehicleRecord>) -> (AccessDecision, &'static str) {
    match vehicle {
        Some(v) if v.is_blacklisted => (AccessDecision::Denied, "vehicle is blacklisted"),
        Some(_) => (AccessDecision::Granted, "known vehicle"),
        None => (AccessDecision::Flagged, "vehicle not registered"),
    }
}

fn parse_direction(raw: Option<&str>) -> Result<EntryDirection, AppError> {
    match non_blank(raw).map(str::to_ascii_lowercase).as_deref() {
        None | Some("entry") => Ok(EntryDirection::Entry),
        Some("exit") => Ok(EntryDirection::Exit),
        Some(other) => Err(AppError::bad_request(
            "INVALID_DIRECTION",
            format!("direction must be entry or exit, got `{other}`"),
        )),
    }
}

fn required_name(raw: &str) -> Result<String, AppError> {
    non_blank(Some(raw))
        .map(ToOwned::to_owned)
        .ok_or_else(|| AppError::bad_request("INVALID_NAME", "name is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(blacklisted: bool) -> VehicleRecord {
        VehicleRecord {
            id: "veh-1".to_string(),
            plate_number: "KA01AB1234".to_string(),
            vehicle_type: None,
            make: None,
            model: None,
            color: None,
            owner_name: None,
            owner_contact: None,
            is_blacklisted: blacklisted,
            first_seen_at: 0,
            last_seen_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn access_decision_matrix() {
        assert_eq!(access_decision_for(None).0, AccessDecision::Flagged);
        assert_eq!(access_decision_for(Some(&vehicle(false))).0, AccessDecision::Granted);
        assert_eq!(access_decision_for(Some(&vehicle(true))).0, AccessDecision::Denied);
    }

    #[test]
    fn direction_defaults_to_entry() {
        assert_eq!(parse_direction(None).ok(), Some(EntryDirection::Entry));
        assert_eq!(parse_direction(Some("EXIT")).ok(), Some(EntryDirection::Exit));
        assert!(parse_direction(Some("sideways")).is_err());
    }
}
