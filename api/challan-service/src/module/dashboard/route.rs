use crate::app::AppState;
use crate::module::dashboard::controller;
use axum::routing::get;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/dashboard/stats", get(controller::dashboard_stats))
        .route("/v1/health", get(controller::health))
        .with_state(state)
}
