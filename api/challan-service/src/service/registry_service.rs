use super::jurisdiction_service::{normalize_plate, plate_state_code, state_name_for_code};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct RegistryClient {
    pub http: Client,
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VehicleRegistryData {
    pub registration_number: String,
    pub owner_name: Option<String>,
    pub father_name: Option<String>,
    pub owner_mobile: Option<String>,
    pub address: Option<String>,
    pub vehicle_class: Option<String>,
    pub maker_model: Option<String>,
    pub color: Option<String>,
    pub fuel_type: Option<String>,
    pub registration_date: Option<String>,
    pub rto: Option<String>,
    pub state: Option<String>,
    pub rc_status: Option<String>,
    pub insurance_valid_upto: Option<String>,
    pub fitness_valid_upto: Option<String>,
    #[serde(default)]
    pub is_test_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryOutcome {
    Found(VehicleRegistryData),
    NotFound { reason: String },
}

impl RegistryClient {
    /// Never fails: every upstream problem collapses into `NotFound`.
    pub async fn lookup(&self, plate: &str) -> RegistryOutcome {
        let reg_no = normalize_plate(plate);
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("x-rapidapi-key", &self.api_key)
            .json(&json!({
                "reg_no": reg_no,
                "consent": "Y",
                "consent_text": "Lookup performed for traffic enforcement",
            }));
        if let Some(host) = reqwest::Url::parse(&self.endpoint)
            .ok()
            .and_then(|u| u.host_str().map(ToOwned::to_owned))
        {
            request = request.header("x-rapidapi-host", host);
        }

        let resp = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                return RegistryOutcome::NotFound {
                    reason: format!("registry unreachable: {e}"),
                };
            }
        };
        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                return RegistryOutcome::NotFound {
                    reason: format!("registry body read failed: {e}"),
                };
            }
        };
        parse_registry_body(&reg_no, status, &body)
    }
}

pub fn parse_registry_body(plate: &str, status: u16, body: &str) -> RegistryOutcome {
    if status != 200 {
        return not_found(format!("registry returned status {status}"));
    }
    if body.trim().is_empty() {
        return not_found("registry returned an empty body");
    }
    let payload: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return not_found(format!("registry body is not valid JSON: {e}")),
    };
    if signals_not_found(&payload) {
        return not_found("registry has no record for this plate");
    }

    let record = payload
        .get("result")
        .or_else(|| payload.get("data"))
        .filter(|v| v.is_object())
        .unwrap_or(&payload);

    let data = VehicleRegistryData {
        registration_number: pick(record, &["reg_no", "registration_number", "rc_number", "regNo"])
            .unwrap_or_else(|| normalize_plate(plate)),
        owner_name: pick(record, &["owner_name", "ownerName", "owner"]),
        father_name: pick(record, &["father_name", "fatherName"]),
        owner_mobile: pick(record, &["mobile_number", "owner_mobile", "mobile"]),
        address: pick(record, &["present_address", "permanent_address", "address"]),
        vehicle_class: pick(record, &["vehicle_class_desc", "vehicle_class", "class"]),
        maker_model: pick(record, &["maker_model", "model", "maker_desc"]),
        color: pick(record, &["color", "vehicle_color", "colour"]),
        fuel_type: pick(record, &["fuel_type", "fuel_descr", "fuel"]),
        registration_date: pick(record, &["reg_date", "registration_date", "regn_dt"]),
        rto: pick(record, &["registered_at", "rto", "office_name"]),
        state: pick(record, &["state"]),
        rc_status: pick(record, &["rc_status", "status_as_on", "status"]),
        insurance_valid_upto: pick(record, &["vehicle_insurance_upto", "insurance_upto"]),
        fitness_valid_upto: pick(record, &["fit_up_to", "fitness_upto"]),
        is_test_data: false,
    };

    if is_empty_record(&data) {
        return not_found("registry returned an all-empty record");
    }
    RegistryOutcome::Found(data)
}

/// Deterministic placeholder data. The state is derived from the plate prefix.
pub fn synthetic_record(plate: &str) -> VehicleRegistryData {
    let registration_number = normalize_plate(plate);
    let code = plate_state_code(&registration_number);
    let state = code.and_then(state_name_for_code).map(ToOwned::to_owned);

    VehicleRegistryData {
        registration_number,
        owner_name: Some("Test Owner".to_string()),
        father_name: None,
        owner_mobile: None,
        address: state.as_ref().map(|s| format!("Test Address, {s}")),
        vehicle_class: Some("Motor Cycle (Test Data)".to_string()),
        maker_model: Some("Test Vehicle".to_string()),
        color: None,
        fuel_type: Some("PETROL".to_string()),
        registration_date: None,
        rto: code.map(|c| format!("{c} RTO")),
        state,
        rc_status: Some("TEST DATA".to_string()),
        insurance_valid_upto: None,
        fitness_valid_upto: None,
        is_test_data: true,
    }
}

fn signals_not_found(payload: &Value) -> bool {
    if payload.get("found").and_then(Value::as_bool) == Some(false) {
        return true;
    }
    if payload
        .get("status")
        .and_then(Value::as_str)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "not_found" | "failed" | "error"))
        .unwrap_or(false)
    {
        return true;
    }
    payload
        .get("message")
        .or_else(|| payload.get("error"))
        .and_then(Value::as_str)
        .map(|m| m.to_ascii_lowercase().contains("not found"))
        .unwrap_or(false)
}

fn pick(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match record.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn is_empty_record(data: &VehicleRegistryData) -> bool {
    [
        &data.owner_name,
        &data.vehicle_class,
        &data.maker_model,
        &data.registration_date,
        &data.rto,
        &data.rc_status,
        &data.fuel_type,
    ]
    .iter()
    .all(|field| field.is_none())
}

fn not_found(reason: impl Into<String>) -> RegistryOutcome {
    RegistryOutcome::NotFound {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_nested_result_payload() {
        let body = r#"{"status":"success","result":{"reg_no":"AP16BZ3508","owner_name":"R*** K****","vehicle_class_desc":"M-Cycle/Scooter(2WN)","maker_model":"HONDA ACTIVA","fuel_type":"PETROL","state":"Andhra Pradesh"}}"#;
        let RegistryOutcome::Found(data) = parse_registry_body("AP16BZ3508", 200, body) else {
            panic!("expected record");
        };
        assert_eq!(data.owner_name.as_deref(), Some("R*** K****"));
        assert_eq!(data.maker_model.as_deref(), Some("HONDA ACTIVA"));
        assert!(!data.is_test_data);
    }

    #[test]
    fn empty_and_broken_bodies_are_not_found() {
        for (status, body) in [(200, ""), (200, "<html>"), (500, "{}"), (200, "{}")] {
            assert!(matches!(
                parse_registry_body("AP16BZ3508", status, body),
                RegistryOutcome::NotFound { .. }
            ));
        }
    }

    #[test]
    fn explicit_not_found_signal() {
        let body = r#"{"status":"success","message":"Record Not Found","result":{"owner_name":"x"}}"#;
        assert!(matches!(
            parse_registry_body("AP16BZ3508", 200, body),
            RegistryOutcome::NotFound { .. }
        ));
    }

    #[test]
    fn synthetic_record_uses_plate_prefix() {
        let data = synthetic_record("ap 16 bz 3508");
        assert_eq!(data.registration_number, "AP16BZ3508");
        assert_eq!(data.state.as_deref(), Some("Andhra Pradesh"));
        assert!(data.is_test_data);
    }
}
