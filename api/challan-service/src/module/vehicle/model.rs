use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub plate_number: String,
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    pub is_blacklisted: bool,
    pub first_seen_at: i64,
    pub last_seen_at: i64,
    pub updated_at: i64,
}
