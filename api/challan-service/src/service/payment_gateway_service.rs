use super::hash_service::hmac_sha256_hex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    pub http: Client,
    pub api_url: String,
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: String,
}

impl RazorpayClient {
    pub async fn create_order(
        &self,
        amount_paise: i64,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder, String> {
        let resp = self
            .http
            .post(format!("{}/orders", self.api_url.trim_end_matches('/')))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_paise,
                "currency": CURRENCY,
                "receipt": receipt,
                "notes": notes,
            }))
            .send()
            .await
            .map_err(|e| format!("payment gateway request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!(
                "payment gateway returned status {}: {}",
                status.as_u16(),
                text.chars().take(200).collect::<String>()
            ));
        }

        resp.json::<GatewayOrder>()
            .await
            .map_err(|e| format!("failed to parse payment gateway order: {e}"))
    }

    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> Result<String, String> {
        payment_signature(order_id, payment_id, &self.key_secret)
    }
}

/// Checkout signature: hex HMAC-SHA256 of `order_id|payment_id` keyed by the key secret.
pub fn payment_signature(order_id: &str, payment_id: &str, secret: &str) -> Result<String, String> {
    hmac_sha256_hex(&format!("{order_id}|{payment_id}"), secret)
}

pub fn rupees_to_paise(amount: i64) -> i64 {
    amount.saturating_mul(100)
}
