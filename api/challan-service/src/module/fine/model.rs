use crate::module::violation::model::ViolationType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FineScheduleEntry {
    pub state: String,
    pub violation_type: ViolationType,
    pub fine_amount: i64,
    #[serde(default)]
    pub repeat_fine_amount: Option<i64>,
    #[serde(default)]
    pub section_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FineSource {
    Custom,
    Schedule,
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineQuote {
    pub amount: i64,
    pub section_reference: Option<String>,
    pub source: FineSource,
}
