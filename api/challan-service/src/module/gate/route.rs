use crate::app::AppState;
use crate::module::gate::controller;
use axum::routing::get;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/cameras",
            get(controller::list_cameras).post(controller::create_camera),
        )
        .route(
            "/v1/gates",
            get(controller::list_gates).post(controller::create_gate),
        )
        .route(
            "/v1/gate-entries",
            get(controller::list_gate_entries).post(controller::record_gate_entry),
        )
        .with_state(state)
}
