use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub redis_url: Option<String>,
    pub public_app_url: String,
    pub public_api_url: String,
    pub evidence_dir: String,
    pub max_evidence_bytes: usize,
    pub fine_schedule_path: String,
    pub default_fine_amount: i64,
    pub ai_gateway_url: String,
    pub ai_gateway_api_key: Option<String>,
    pub ai_model: String,
    pub vehicle_registry_api_url: String,
    pub vehicle_registry_api_key: Option<String>,
    pub msg91_auth_key: Option<String>,
    pub msg91_sender_id: String,
    pub msg91_template_id: Option<String>,
    pub msg91_api_url: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub razorpay_api_url: String,
    pub payment_verify_signature: bool,
    pub operator_jwt_secret: Option<String>,
    pub upstream_timeout_seconds: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();

        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            redis_url: read_optional_env("REDIS_URL"),
            public_app_url: read_optional_string("PUBLIC_APP_URL", "http://localhost:5173"),
            public_api_url: read_optional_string("PUBLIC_API_URL", "http://127.0.0.1:8090"),
            evidence_dir: read_optional_string("EVIDENCE_DIR", "data/evidence"),
            max_evidence_bytes: read_optional_u64("MAX_EVIDENCE_BYTES", 50 * 1024 * 1024)?
                as usize,
            fine_schedule_path: read_optional_string(
                "FINE_SCHEDULE_PATH",
                "config/fine_schedule.json",
            ),
            default_fine_amount: read_optional_i64("DEFAULT_FINE_AMOUNT", 500)?,
            ai_gateway_url: read_optional_string(
                "AI_GATEWAY_URL",
                "https://ai.gateway.lovable.dev/v1/chat/completions",
            ),
            ai_gateway_api_key: read_optional_env("AI_GATEWAY_API_KEY"),
            ai_model: read_optional_string("AI_MODEL", "google/gemini-2.5-flash"),
            vehicle_registry_api_url: read_optional_string(
                "VEHICLE_REGISTRY_API_URL",
                "https://rto-vehicle-information-verification-india.p.rapidapi.com/api/v1/rc/vehicleinfo",
            ),
            vehicle_registry_api_key: read_optional_env("VEHICLE_REGISTRY_API_KEY"),
            msg91_auth_key: read_optional_env("MSG91_AUTH_KEY"),
            msg91_sender_id: read_optional_string("MSG91_SENDER_ID", "ECHALN"),
            msg91_template_id: read_optional_env("MSG91_TEMPLATE_ID"),
            msg91_api_url: read_optional_string(
                "MSG91_API_URL",
                "https://control.msg91.com/api/v5/flow/",
            ),
            razorpay_key_id: read_optional_env("RAZORPAY_KEY_ID"),
            razorpay_key_secret: read_optional_env("RAZORPAY_KEY_SECRET"),
            razorpay_api_url: read_optional_string(
                "RAZORPAY_API_URL",
                "https://api.razorpay.com/v1",
            ),
            payment_verify_signature: read_optional_bool("PAYMENT_VERIFY_SIGNATURE", false),
            operator_jwt_secret: read_optional_env("OPERATOR_JWT_SECRET"),
            upstream_timeout_seconds: match read_optional_env("UPSTREAM_TIMEOUT_SECONDS") {
                Some(v) => Some(
                    v.parse::<u64>()
                        .map_err(|e| format!("invalid UPSTREAM_TIMEOUT_SECONDS: {e}"))?,
                ),
                None => None,
            },
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_i64(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<i64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// Blank values count as unset so an empty `KEY=` line in .env keeps demo mode.
fn read_optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_optional_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path(path);
    }
}
