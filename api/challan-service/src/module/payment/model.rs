use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRecordStatus {
    Created,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub challan_id: String,
    pub gateway_order_id: String,
    pub amount: i64,
    pub amount_paise: i64,
    pub currency: String,
    pub status: PaymentRecordStatus,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    pub payer_phone: Option<String>,
    pub mock: bool,
    pub created_at: i64,
    pub paid_at: Option<i64>,
}
