use super::model::VehicleRecord;
use crate::service::registry_service::VehicleRegistryData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleLookupRequest {
    pub plate_number: Option<String>,
}

/// `data` is always present on success; `mock`/`not_found` say where it came from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleLookupResponse {
    pub success: bool,
    pub mock: bool,
    pub not_found: bool,
    pub data: VehicleRegistryData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleListQuery {
    pub blacklisted: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleListResponse {
    pub success: bool,
    pub vehicles: Vec<VehicleRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpsertVehicleRequest {
    pub plate_number: String,
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlacklistRequest {
    pub blacklisted: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleResponse {
    pub success: bool,
    pub created: bool,
    pub vehicle: VehicleRecord,
}
