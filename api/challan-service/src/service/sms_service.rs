use reqwest::Client;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct Msg91Client {
    pub http: Client,
    pub endpoint: String,
    pub auth_key: String,
    pub sender_id: String,
    pub template_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmsMessage {
    pub challan_number: String,
    pub plate_number: String,
    pub violation_label: String,
    pub fine_amount: i64,
    pub public_url: String,
}

impl SmsMessage {
    pub fn render(&self) -> String {
        format!(
            "eChallan {} issued to vehicle {} for {}. Fine Rs.{}. View and pay: {}",
            self.challan_number,
            self.plate_number,
            self.violation_label,
            self.fine_amount,
            self.public_url
        )
    }
}

impl Msg91Client {
    /// Sends through the MSG91 flow API. Returns the gateway request id.
    pub async fn send(&self, mobile: &str, message: &SmsMessage) -> Result<String, String> {
        let template_id = self
            .template_id
            .as_deref()
            .ok_or_else(|| "MSG91_TEMPLATE_ID is not configured".to_string())?;
        let body = json!({
            "template_id": template_id,
            "sender": self.sender_id,
            "short_url": "0",
            "recipients": [{
                "mobiles": mobile,
                "challan": message.challan_number,
                "vehicle": message.plate_number,
                "violation": message.violation_label,
                "amount": message.fine_amount.to_string(),
                "link": message.public_url,
            }],
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .header("authkey", &self.auth_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("sms gateway request failed: {e}"))?;
        let status = resp.status();
        let payload = resp
            .json::<Value>()
            .await
            .map_err(|e| format!("failed to parse sms gateway payload: {e}"))?;

        let accepted = payload.get("type").and_then(Value::as_str) == Some("success");
        if !status.is_success() || !accepted {
            return Err(format!(
                "sms gateway rejected message: status={} message={}",
                status.as_u16(),
                payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
            ));
        }
        Ok(payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

/// Normalizes to `91XXXXXXXXXX`; anything that is not a 10-digit Indian mobile is rejected.
pub fn normalize_indian_mobile(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return None,
    };
    if !local.starts_with(|c: char| matches!(c, '6'..='9')) {
        return None;
    }
    Some(format!("91{local}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_numbers_are_normalized() {
        assert_eq!(normalize_indian_mobile("98765 43210").as_deref(), Some("919876543210"));
        assert_eq!(normalize_indian_mobile("+91-9876543210").as_deref(), Some("919876543210"));
        assert_eq!(normalize_indian_mobile("09876543210").as_deref(), Some("919876543210"));
        assert_eq!(normalize_indian_mobile("12345"), None);
        assert_eq!(normalize_indian_mobile("1234567890"), None);
    }

    #[test]
    fn message_mentions_link_and_amount() {
        let msg = SmsMessage {
            challan_number: "ECH-AP-1-ABCD".to_string(),
            plate_number: "AP16BZ3508".to_string(),
            violation_label: "Riding Without Helmet".to_string(),
            fine_amount: 1000,
            public_url: "http://x/challan/t".to_string(),
        }
        .render();
        assert!(msg.contains("Rs.1000"));
        assert!(msg.contains("http://x/challan/t"));
    }
}
