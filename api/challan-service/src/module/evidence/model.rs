use crate::service::detection_service::DetectionResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: String,
    pub file_name: String,
    pub stored_name: String,
    pub media_kind: MediaKind,
    pub public_url: String,
    pub byte_len: u64,
    pub sha256: String,
    pub status: EvidenceStatus,
    pub detection: Option<DetectionResult>,
    pub processing_time_ms: Option<u64>,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
