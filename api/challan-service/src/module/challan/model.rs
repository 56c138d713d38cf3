use crate::module::violation::model::{Severity, ViolationType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChallanStatus {
    Pending,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallanRecord {
    pub id: String,
    pub challan_number: String,
    pub plate_number: String,
    pub violation_type: ViolationType,
    pub violation_label: String,
    pub state: String,
    pub section_reference: Option<String>,
    pub fine_amount: i64,
    pub status: ChallanStatus,
    pub payment_status: PaymentStatus,
    pub public_token: String,
    pub sms_sent: bool,
    pub sms_sent_at: Option<i64>,
    pub sms_mock: bool,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub evidence_urls: Vec<String>,
    pub vehicle_data: Option<Value>,
    pub ai_detection_data: Option<Value>,
    pub severity: Severity,
    pub vehicle_id: Option<String>,
    pub violation_id: Option<String>,
    pub issued_by: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
}

impl ChallanRecord {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
