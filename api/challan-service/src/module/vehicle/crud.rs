use super::model::VehicleRecord;
use super::schema::{
    BlacklistRequest, UpsertVehicleRequest, VehicleListQuery, VehicleListResponse,
    VehicleLookupRequest, VehicleLookupResponse, VehicleResponse,
};
use crate::app::AppState;
use crate::infra::VEHICLES_COLLECTION;
use crate::module::error::AppError;
use crate::service::auth_service::authorize_operator;
use crate::service::integration::Integration;
use crate::service::jurisdiction_service::normalize_plate;
use crate::service::metrics_service;
use crate::service::registry_service::{synthetic_record, RegistryOutcome};
use crate::service::validation_service::validate_plate;
use crate::store::{lock_store, now_unix, persist_record, StoreInner};
use axum::http::HeaderMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Attributes seen for a plate, merged into the vehicle row without erasing known values.
#[derive(Debug, Clone, Default)]
pub struct VehicleObservation {
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
}

pub async fn lookup_vehicle(
    state: &AppState,
    headers: &HeaderMap,
    req: VehicleLookupRequest,
) -> Result<VehicleLookupResponse, AppError> {
    let operator = authorize_operator(&state.integrations.operator_auth, headers)?;
    let raw = req.plate_number.unwrap_or_default();
    validate_plate(&raw)?;
    let plate = normalize_plate(&raw);

    let resp = match &state.integrations.registry {
        Integration::Configured(client) => match client.lookup(&plate).await {
            RegistryOutcome::Found(data) => {
                info!(operator = %operator, plate = %plate, "vehicle registry lookup succeeded");
                VehicleLookupResponse {
                    success: true,
                    mock: false,
                    not_found: false,
                    data,
                    message: None,
                }
            }
            RegistryOutcome::NotFound { reason } => {
                metrics_service::inc_lookups_mocked();
                warn!(plate = %plate, reason = %reason, "registry lookup failed; returning synthetic record");
                VehicleLookupResponse {
                    success: true,
                    mock: true,
                    not_found: true,
                    data: synthetic_record(&plate),
                    message: Some(reason),
                }
            }
        },
        Integration::Unconfigured => {
            metrics_service::inc_lookups_mocked();
            warn!(plate = %plate, "vehicle registry not configured; returning synthetic record");
            VehicleLookupResponse {
                success: true,
                mock: true,
                not_found: false,
                data: synthetic_record(&plate),
                message: Some("vehicle registry not configured; test data returned".to_string()),
            }
        }
    };
    Ok(resp)
}

pub async fn list_vehicles(
    state: &AppState,
    query: VehicleListQuery,
) -> Result<VehicleListResponse, AppError> {
    let store = lock_store(&state.store)?;
    let mut vehicles: Vec<VehicleRecord> = store
        .vehicles_by_plate
        .values()
        .filter(|v| query.blacklisted.map_or(true, |b| v.is_blacklisted == b))
        .cloned()
        .collect();
    vehicles.sort_by(|a, b| b.last_seen_at.cmp(&a.last_seen_at));
    Ok(VehicleListResponse {
        success: true,
        vehicles,
    })
}

pub async fn upsert_vehicle(
    state: &AppState,
    headers: &HeaderMap,
    req: UpsertVehicleRequest,
) -> Result<VehicleResponse, AppError> {
    authorize_operator(&state.integrations.operator_auth, headers)?;
    validate_plate(&req.plate_number)?;
    let plate = normalize_plate(&req.plate_number);
    let observation = VehicleObservation {
        vehicle_type: req.vehicle_type,
        make: req.make,
        model: req.model,
        color: req.color,
        owner_name: req.owner_name,
        owner_contact: req.owner_contact,
    };

    let (vehicle, created) = {
        let mut store = lock_store(&state.store)?;
        observe_vehicle(&mut store, &plate, observation, now_unix())
    };
    publish_vehicle(state, &vehicle, created).await;
    Ok(VehicleResponse {
        success: true,
        created,
        vehicle,
    })
}

pub async fn set_blacklist(
    state: &AppState,
    headers: &HeaderMap,
    plate_number: &str,
    req: BlacklistRequest,
) -> Result<VehicleResponse, AppError> {
    let operator = authorize_operator(&state.integrations.operator_auth, headers)?;
    validate_plate(plate_number)?;
    let plate = normalize_plate(plate_number);

    let vehicle = {
        let mut store = lock_store(&state.store)?;
        let vehicle = store.vehicles_by_plate.get_mut(&plate).ok_or_else(|| {
            AppError::not_found("VEHICLE_NOT_FOUND", format!("no vehicle with plate {plate}"))
        })?;
        vehicle.is_blacklisted = req.blacklisted;
        vehicle.updated_at = now_unix();
        vehicle.clone()
    };

    persist_record(state, VEHICLES_COLLECTION, &vehicle.plate_number, &vehicle).await;
    state.feed.publish_update(VEHICLES_COLLECTION, &vehicle);
    info!(
        operator = %operator,
        plate = %vehicle.plate_number,
        blacklisted = vehicle.is_blacklisted,
        reason = req.reason.as_deref().unwrap_or(""),
        "vehicle blacklist flag changed"
    );
    Ok(VehicleResponse {
        success: true,
        created: false,
        vehicle,
    })
}

/// Inserts the plate on first sight, otherwise bumps `last_seen_at` and fills in
/// attributes the row does not have yet. Returns the row and whether it was created.
pub fn observe_vehicle(
    store: &mut StoreInner,
    plate: &str,
    observation: VehicleObservation,
    now: i64,
) -> (VehicleRecord, bool) {
    if let Some(existing) = store.vehicles_by_plate.get_mut(plate) {
        existing.last_seen_at = now;
        existing.updated_at = now;
        merge(&mut existing.vehicle_type, observation.vehicle_type);
        merge(&mut existing.make, observation.make);
        merge(&mut existing.model, observation.model);
        merge(&mut existing.color, observation.color);
        merge(&mut existing.owner_name, observation.owner_name);
        merge(&mut existing.owner_contact, observation.owner_contact);
        return (existing.clone(), false);
    }

    let vehicle = VehicleRecord {
        id: Uuid::new_v4().to_string(),
        plate_number: plate.to_string(),
        vehicle_type: observation.vehicle_type,
        make: observation.make,
        model: observation.model,
        color: observation.color,
        owner_name: observation.owner_name,
        owner_contact: observation.owner_contact,
        is_blacklisted: false,
        first_seen_at: now,
        last_seen_at: now,
        updated_at: now,
    };
    store
        .vehicles_by_plate
        .insert(vehicle.plate_number.clone(), vehicle.clone());
    (vehicle, true)
}

pub async fn publish_vehicle(state: &AppState, vehicle: &VehicleRecord, created: bool) {
    persist_record(state, VEHICLES_COLLECTION, &vehicle.plate_number, vehicle).await;
    if created {
        state.feed.publish_insert(VEHICLES_COLLECTION, vehicle);
    } else {
        state.feed.publish_update(VEHICLES_COLLECTION, vehicle);
    }
}

fn merge(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}
