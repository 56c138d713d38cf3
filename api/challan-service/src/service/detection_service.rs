use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are a traffic enforcement vision system. Inspect the evidence \
and report every vehicle you can see. Respond ONLY with a JSON object of the form \
{\"vehicles_detected\":[{\"vehicle_type\":string,\"plate_number\":string|null,\
\"plate_confidence\":number,\"color\":string|null,\"make\":string|null,\
\"violations\":[string],\"confidence\":number,\"description\":string}],\
\"scene_description\":string,\"total_vehicles\":number}. Use only these violation codes: \
helmet, helmet_pillion, seatbelt, triple_riding, mobile_phone, wrong_way, red_light, \
illegal_parking, overloading. Write Indian plates without spaces, e.g. AP16BZ3508.";

#[derive(Debug, Clone)]
pub struct AiGatewayClient {
    pub http: Client,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectionResult {
    #[serde(default)]
    pub vehicles_detected: Vec<DetectedVehicle>,
    #[serde(default)]
    pub scene_description: String,
    #[serde(default)]
    pub total_vehicles: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectedVehicle {
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub plate_confidence: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum MediaRef<'a> {
    Image(&'a str),
    Video(&'a str),
}

impl MediaRef<'_> {
    pub fn url(&self) -> &str {
        match self {
            Self::Image(url) | Self::Video(url) => url,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DetectionError {
    #[error("ai gateway rate limited: {0}")]
    RateLimited(String),

    #[error("ai gateway credits exhausted: {0}")]
    CreditsExhausted(String),

    #[error("ai gateway request failed: {0}")]
    Upstream(String),

    #[error("ai gateway returned invalid detection: {0}")]
    InvalidResponse(String),
}

impl AiGatewayClient {
    pub async fn detect(&self, media: MediaRef<'_>) -> Result<DetectionResult, DetectionError> {
        let evidence_part = match media {
            MediaRef::Image(url) => json!({"type": "image_url", "image_url": {"url": url}}),
            MediaRef::Video(url) => json!({
                "type": "text",
                "text": format!("Video evidence is available at {url}. Analyse its key frames."),
            }),
        };
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": [
                    {"type": "text", "text": "Detect vehicles, number plates and traffic violations in this evidence."},
                    evidence_part,
                ]},
            ],
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DetectionError::Upstream(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DetectionError::RateLimited(
                "rate limit exceeded, try again later".to_string(),
            ));
        }
        if status == StatusCode::PAYMENT_REQUIRED {
            return Err(DetectionError::CreditsExhausted(
                "AI credits exhausted, add funds to continue".to_string(),
            ));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DetectionError::Upstream(format!(
                "status {}: {}",
                status.as_u16(),
                truncate(&text, 200)
            )));
        }

        let payload = resp
            .json::<Value>()
            .await
            .map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DetectionError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        extract_detection(content).map_err(DetectionError::InvalidResponse)
    }
}

/// Parses model output that may be wrapped in markdown fences or surrounded by prose.
pub fn extract_detection(content: &str) -> Result<DetectionResult, String> {
    let trimmed = strip_code_fence(content.trim());
    let parsed = match serde_json::from_str::<DetectionResult>(trimmed) {
        Ok(v) => v,
        Err(first_err) => {
            let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
                return Err(format!("no JSON object in model output: {first_err}"));
            };
            if end <= start {
                return Err(format!("no JSON object in model output: {first_err}"));
            }
            serde_json::from_str::<DetectionResult>(&trimmed[start..=end])
                .map_err(|e| format!("failed to parse detection JSON: {e}"))?
        }
    };
    Ok(normalize(parsed))
}

/// Clearly marked stand-in used when no AI gateway key is configured.
pub fn synthetic_detection(media: MediaRef<'_>) -> DetectionResult {
    DetectionResult {
        vehicles_detected: vec![DetectedVehicle {
            vehicle_type: "motorcycle".to_string(),
            plate_number: Some("AP16BZ3508".to_string()),
            plate_confidence: Some(0.0),
            color: Some("black".to_string()),
            make: None,
            violations: vec!["helmet".to_string()],
            confidence: Some(0.0),
            description: Some("synthetic detection for demo mode".to_string()),
        }],
        scene_description: format!(
            "SYNTHETIC RESULT: AI gateway not configured, {} was not analysed",
            media.url()
        ),
        total_vehicles: 1,
    }
}

fn normalize(mut result: DetectionResult) -> DetectionResult {
    for vehicle in &mut result.vehicles_detected {
        vehicle.plate_number = vehicle
            .plate_number
            .take()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("unknown"));
        vehicle.violations = vehicle
            .violations
            .iter()
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
    }
    let counted = result.vehicles_detected.len() as u32;
    if result.total_vehicles < counted {
        result.total_vehicles = counted;
    }
    result
}

fn strip_code_fence(input: &str) -> &str {
    let Some(rest) = input.strip_prefix("```") else {
        return input;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_model_output() {
        let content = "```json\n{\"vehicles_detected\":[{\"vehicle_type\":\"motorcycle\",\"plate_number\":\"AP16BZ3508\",\"violations\":[\"Helmet\"]}],\"scene_description\":\"junction\"}\n```";
        let result = extract_detection(content).expect("parse");
        assert_eq!(result.total_vehicles, 1);
        assert_eq!(result.vehicles_detected[0].violations, vec!["helmet"]);
        assert_eq!(
            result.vehicles_detected[0].plate_number.as_deref(),
            Some("AP16BZ3508")
        );
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let content = "Here you go: {\"vehicles_detected\":[],\"scene_description\":\"empty road\",\"total_vehicles\":0} hope it helps";
        let result = extract_detection(content).expect("parse");
        assert!(result.vehicles_detected.is_empty());
        assert_eq!(result.scene_description, "empty road");
    }

    #[test]
    fn unknown_plate_is_dropped() {
        let content = "{\"vehicles_detected\":[{\"vehicle_type\":\"car\",\"plate_number\":\"unknown\"}]}";
        let result = extract_detection(content).expect("parse");
        assert_eq!(result.vehicles_detected[0].plate_number, None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(extract_detection("no json here").is_err());
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = DetectionError::RateLimited("slow down".to_string());
        assert_eq!(err.to_string(), "ai gateway rate limited: slow down");
        let err = DetectionError::InvalidResponse("no json".to_string());
        assert_eq!(err.to_string(), "ai gateway returned invalid detection: no json");
    }
}
