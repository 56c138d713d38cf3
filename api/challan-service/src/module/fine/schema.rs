use super::model::FineScheduleEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FineListQuery {
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FineListResponse {
    pub success: bool,
    pub default_fine_amount: i64,
    pub fines: Vec<FineScheduleEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpsertFineRequest {
    pub state: String,
    pub violation_type: String,
    pub fine_amount: i64,
    pub repeat_fine_amount: Option<i64>,
    pub section_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpsertFineResponse {
    pub success: bool,
    pub fine: FineScheduleEntry,
}
