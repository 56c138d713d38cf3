use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Upload,
    Detecting,
    Detected,
    Lookup,
    LookedUp,
    Challan,
    Done,
}

impl WorkflowStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Detecting => "detecting",
            Self::Detected => "detected",
            Self::Lookup => "lookup",
            Self::LookedUp => "looked_up",
            Self::Challan => "challan",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "webm" | "avi" | "mkv" => Self::Video,
            _ => Self::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlateCorrection {
    pub original: String,
    pub corrected: String,
    pub corrected_at: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadedEvidence {
    pub queue_id: String,
    pub public_url: String,
}

/// Detection output as returned by `process-evidence`; `result` is kept raw for the audit payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectionOutcome {
    pub result: Value,
    pub mock: bool,
    pub processing_time_ms: u64,
}

impl DetectionOutcome {
    pub fn vehicles(&self) -> &[Value] {
        self.result["vehicles_detected"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First non-blank plate the detector read.
    pub fn primary_plate(&self) -> Option<String> {
        self.vehicles().iter().find_map(|v| {
            v["plate_number"]
                .as_str()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
        })
    }

    pub fn primary_violation(&self) -> Option<String> {
        self.vehicles().iter().find_map(|v| {
            v["violations"]
                .as_array()
                .and_then(|list| list.iter().find_map(Value::as_str))
                .map(str::to_string)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LookupOutcome {
    pub data: Value,
    pub mock: bool,
    pub not_found: bool,
    pub is_test_data: bool,
}

impl LookupOutcome {
    /// Stand-in registry record used when the upstream has nothing usable.
    pub fn synthetic(plate: &str) -> Self {
        Self {
            data: json!({
                "registration_number": plate,
                "owner_name": "Test Owner",
                "vehicle_class": "Unknown",
                "state": Value::Null,
                "is_test_data": true,
            }),
            mock: true,
            not_found: true,
            is_test_data: true,
        }
    }

    pub fn registry_state(&self) -> Option<String> {
        self.data["state"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// True when every field besides the plate itself is empty.
pub fn is_empty_record(data: &Value) -> bool {
    let Some(fields) = data.as_object() else {
        return true;
    };
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != "registration_number" && key.as_str() != "is_test_data")
        .all(|(_, value)| match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViolationSelection {
    pub violation_type: String,
    #[serde(default)]
    pub violation_label: Option<String>,
    #[serde(default)]
    pub custom_fine_amount: Option<i64>,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChallanRequest {
    pub plate_number: String,
    pub violation_type: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub evidence_urls: Vec<String>,
    pub vehicle_data: Value,
    pub ai_detection_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fine_amount: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IssuedChallan {
    pub challan_id: String,
    pub challan_number: String,
    pub public_url: String,
    pub fine_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationOutcome {
    pub mock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceItem {
    pub id: String,
    pub file_name: String,
    pub media_kind: MediaKind,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub step: WorkflowStep,
    pub uploaded: Option<UploadedEvidence>,
    pub detection: Option<DetectionOutcome>,
    pub detection_latency_ms: Option<u64>,
    pub original_plate: Option<String>,
    pub plate: Option<String>,
    pub corrections: Vec<PlateCorrection>,
    pub lookup: Option<LookupOutcome>,
    pub selection: Option<ViolationSelection>,
    pub challan: Option<IssuedChallan>,
    pub notification: Option<NotificationOutcome>,
    pub notification_error: Option<String>,
    pub last_error: Option<String>,
}

impl EvidenceItem {
    pub fn new(id: String, file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            media_kind: MediaKind::from_file_name(&file_name),
            id,
            file_name,
            bytes,
            step: WorkflowStep::Upload,
            uploaded: None,
            detection: None,
            detection_latency_ms: None,
            original_plate: None,
            plate: None,
            corrections: Vec::new(),
            lookup: None,
            selection: None,
            challan: None,
            notification: None,
            notification_error: None,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub api_base_url: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub default_state: Option<String>,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub path: String,
    #[serde(default)]
    pub plate_correction: Option<String>,
    #[serde(default)]
    pub violation_type: Option<String>,
    #[serde(default)]
    pub violation_label: Option<String>,
    #[serde(default)]
    pub custom_fine_amount: Option<i64>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub issued: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub path: String,
    pub step: WorkflowStep,
    pub plate: Option<String>,
    pub corrections: usize,
    pub mock_detection: Option<bool>,
    pub test_data_lookup: Option<bool>,
    pub challan_number: Option<String>,
    pub public_url: Option<String>,
    pub fine_amount: Option<i64>,
    pub notification_error: Option<String>,
    pub error: Option<String>,
}
