use super::model::{ChallanRecord, ChallanStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Required fields are optional here so a missing one is reported by the issuer
/// rather than by the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateChallanRequest {
    pub plate_number: Option<String>,
    pub violation_type: Option<String>,
    pub state: Option<String>,
    pub violation_label: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
    pub vehicle_data: Option<Value>,
    pub ai_detection_data: Option<Value>,
    pub severity: Option<String>,
    pub vehicle_id: Option<String>,
    pub violation_id: Option<String>,
    pub issued_by: Option<String>,
    pub custom_fine_amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateChallanResponse {
    pub success: bool,
    pub challan: ChallanRecord,
    pub public_url: String,
    pub fine_amount: i64,
    pub challan_number: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicChallanQuery {
    pub token: Option<String>,
}

/// Fields safe to show a citizen holding the public link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicChallanView {
    pub challan_number: String,
    pub plate_number: String,
    pub violation_type: String,
    pub violation_label: String,
    pub state: String,
    pub section_reference: Option<String>,
    pub fine_amount: i64,
    pub status: ChallanStatus,
    pub payment_status: PaymentStatus,
    pub image_url: Option<String>,
    pub issued_at: i64,
    pub paid_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicChallanResponse {
    pub success: bool,
    pub challan: PublicChallanView,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallanListQuery {
    pub status: Option<String>,
    pub plate_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallanListResponse {
    pub success: bool,
    pub challans: Vec<ChallanRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallanResponse {
    pub success: bool,
    pub challan: ChallanRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallanNotesRequest {
    pub notes: String,
}
