use super::model::{CameraRecord, GateEntryRecord, GateRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateCameraRequest {
    pub name: String,
    pub location: Option<String>,
    pub stream_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraResponse {
    pub success: bool,
    pub camera: CameraRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraListResponse {
    pub success: bool,
    pub cameras: Vec<CameraRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateGateRequest {
    pub name: String,
    pub location: Option<String>,
    pub camera_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateResponse {
    pub success: bool,
    pub gate: GateRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateListResponse {
    pub success: bool,
    pub gates: Vec<GateRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateGateEntryRequest {
    pub gate_id: String,
    pub plate_number: String,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateEntryResponse {
    pub success: bool,
    pub entry: GateEntryRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateEntryListQuery {
    pub gate_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateEntryListResponse {
    pub success: bool,
    pub entries: Vec<GateEntryRecord>,
}
