use super::model::EvidenceRecord;
use crate::service::detection_service::DetectionResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadEvidenceQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadEvidenceResponse {
    pub success: bool,
    pub queue_id: String,
    pub public_url: String,
    pub evidence: EvidenceRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvidenceResponse {
    pub success: bool,
    pub evidence: EvidenceRecord,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessEvidenceRequest {
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub queue_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessEvidenceResponse {
    pub success: bool,
    pub result: DetectionResult,
    pub mock: bool,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default)]
    pub violation_ids: Vec<String>,
}
