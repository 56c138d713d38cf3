use serde::{Deserialize, Serialize};

/// Body of `POST /v1/razorpay-payment`, discriminated by `action`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentAction {
    CreateOrder(CreateOrderRequest),
    VerifyPayment(VerifyPaymentRequest),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateOrderRequest {
    pub challan_id: Option<String>,
    pub public_token: Option<String>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    pub payer_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub amount_paise: i64,
    pub currency: String,
    pub key_id: Option<String>,
    pub challan_number: String,
    pub mock: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub idempotent: bool,
    pub challan_id: String,
    pub challan_number: String,
    pub payment_id: String,
    pub paid_at: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PaymentResponse {
    Order(CreateOrderResponse),
    Verified(VerifyPaymentResponse),
}
