use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    Helmet,
    HelmetPillion,
    Seatbelt,
    TripleRiding,
    MobilePhone,
    WrongWay,
    RedLight,
    IllegalParking,
    Overloading,
    Other,
}

impl ViolationType {
    pub const ALL: [ViolationType; 10] = [
        Self::Helmet,
        Self::HelmetPillion,
        Self::Seatbelt,
        Self::TripleRiding,
        Self::MobilePhone,
        Self::WrongWay,
        Self::RedLight,
        Self::IllegalParking,
        Self::Overloading,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::HelmetPillion => "helmet_pillion",
            Self::Seatbelt => "seatbelt",
            Self::TripleRiding => "triple_riding",
            Self::MobilePhone => "mobile_phone",
            Self::WrongWay => "wrong_way",
            Self::RedLight => "red_light",
            Self::IllegalParking => "illegal_parking",
            Self::Overloading => "overloading",
            Self::Other => "other",
        }
    }

    /// Accepts the canonical codes plus the spellings the vision model tends to emit.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        let parsed = match key.as_str() {
            "helmet" | "no_helmet" | "without_helmet" => Self::Helmet,
            "helmet_pillion" | "pillion_helmet" | "pillion_no_helmet" => Self::HelmetPillion,
            "seatbelt" | "seat_belt" | "no_seatbelt" => Self::Seatbelt,
            "triple_riding" | "triple" => Self::TripleRiding,
            "mobile_phone" | "mobile" | "phone_usage" | "using_phone" => Self::MobilePhone,
            "wrong_way" | "wrong_side" => Self::WrongWay,
            "red_light" | "red_light_jump" | "signal_jump" => Self::RedLight,
            "illegal_parking" | "no_parking" | "parking" => Self::IllegalParking,
            "overloading" | "overload" => Self::Overloading,
            "other" => Self::Other,
            _ => return None,
        };
        Some(parsed)
    }

    /// `helmet_pillion` only exists in the operator UI; it is stored and fined as `helmet`.
    pub fn stored(self) -> Self {
        match self {
            Self::HelmetPillion => Self::Helmet,
            other => other,
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            Self::Helmet => "Riding Without Helmet",
            Self::HelmetPillion => "Pillion Rider Without Helmet",
            Self::Seatbelt => "Driving Without Seatbelt",
            Self::TripleRiding => "Triple Riding",
            Self::MobilePhone => "Using Mobile Phone While Driving",
            Self::WrongWay => "Wrong Way Driving",
            Self::RedLight => "Red Light Jumping",
            Self::IllegalParking => "Illegal Parking",
            Self::Overloading => "Overloading",
            Self::Other => "Other Violation",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            Self::IllegalParking | Self::Other => Severity::Low,
            Self::Helmet | Self::HelmetPillion | Self::Seatbelt | Self::Overloading => {
                Severity::Medium
            }
            Self::TripleRiding | Self::MobilePhone => Severity::High,
            Self::WrongWay | Self::RedLight => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub id: String,
    pub vehicle_id: Option<String>,
    pub plate_number: String,
    pub camera_id: Option<String>,
    pub evidence_id: Option<String>,
    pub evidence_url: Option<String>,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub fine_amount: i64,
    pub confidence: Option<f64>,
    pub is_resolved: bool,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub detected_at: i64,
}
