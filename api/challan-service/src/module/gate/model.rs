use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub stream_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRecord {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub camera_id: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessDecision {
    Granted,
    Denied,
    Flagged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEntryRecord {
    pub id: String,
    pub gate_id: String,
    pub plate_number: String,
    pub vehicle_id: Option<String>,
    pub direction: EntryDirection,
    pub access_decision: AccessDecision,
    pub decision_reason: String,
    pub recorded_at: i64,
}
