use challan_service::app::{build_router, AppState};
use challan_service::config::db::RedisConfig;
use challan_service::config::environment::AppConfig;
use challan_service::infra::init_infra;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    let infra = match RedisConfig::from_app(&config) {
        Some(redis) => match init_infra(&redis).await {
            Ok(i) => Some(i),
            Err(e) => {
                warn!(error = %e, "infra init failed; running without persistence");
                None
            }
        },
        None => {
            warn!("REDIS_URL not configured; running without persistence");
            None
        }
    };

    let state = AppState::new(config, infra);
    let integrations = state.integrations.status();
    info!(
        env = %state.config.rust_env,
        host = %state.config.api_host,
        port = state.config.api_port,
        detection = integrations.detection,
        registry = integrations.registry,
        sms = integrations.sms,
        payments = integrations.payments,
        operator_auth = integrations.operator_auth,
        "challan-service started"
    );

    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
