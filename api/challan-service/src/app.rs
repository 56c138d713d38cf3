use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::fine::crud::load_fine_schedule;
use crate::module::{
    challan, dashboard, evidence, fine, gate, notification, payment, realtime, vehicle, violation,
};
use crate::service::integration::Integrations;
use crate::service::realtime_service::ChangeFeed;
use crate::store::BackOfficeStore;
use axum::http::Method;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<BackOfficeStore>,
    pub infra: Option<InfraClients>,
    pub integrations: Arc<Integrations>,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(config: AppConfig, infra: Option<InfraClients>) -> Self {
        let fines = match load_fine_schedule(&config.fine_schedule_path) {
            Ok(entries) => {
                info!(path = %config.fine_schedule_path, entries = entries.len(), "fine schedule loaded");
                entries
            }
            Err(e) => {
                warn!(error = %e, "fine schedule unavailable; default fine applies everywhere");
                Vec::new()
            }
        };
        let integrations = Integrations::from_config(&config);

        Self {
            store: Arc::new(BackOfficeStore::with_fines(fines)),
            integrations: Arc::new(integrations),
            feed: ChangeFeed::new(CHANGE_FEED_CAPACITY),
            config,
            infra,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(challan::route::register_routes(state.clone()))
        .merge(evidence::route::register_routes(state.clone()))
        .merge(vehicle::route::register_routes(state.clone()))
        .merge(violation::route::register_routes(state.clone()))
        .merge(gate::route::register_routes(state.clone()))
        .merge(fine::route::register_routes(state.clone()))
        .merge(payment::route::register_routes(state.clone()))
        .merge(notification::route::register_routes(state.clone()))
        .merge(realtime::route::register_routes(state.clone()))
        .merge(dashboard::route::register_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
