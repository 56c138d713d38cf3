use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SendChallanSmsRequest {
    pub challan_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendChallanSmsResponse {
    pub success: bool,
    pub mock: bool,
    pub public_url: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_reference: Option<String>,
}
