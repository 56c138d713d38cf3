use super::model::ViolationRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViolationListQuery {
    pub resolved: Option<bool>,
    pub plate_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViolationListResponse {
    pub success: bool,
    pub violations: Vec<ViolationRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateViolationRequest {
    pub plate_number: String,
    pub violation_type: String,
    pub state: Option<String>,
    pub camera_id: Option<String>,
    pub evidence_id: Option<String>,
    pub evidence_url: Option<String>,
    pub severity: Option<String>,
    pub fine_amount: Option<i64>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveViolationRequest {
    pub resolved_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViolationResponse {
    pub success: bool,
    pub violation: ViolationRecord,
}
