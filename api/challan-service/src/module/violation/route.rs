use crate::app::AppState;
use crate::module::violation::controller;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/violations",
            get(controller::list_violations).post(controller::create_violation),
        )
        .route(
            "/v1/violations/:id/resolve",
            post(controller::resolve_violation),
        )
        .with_state(state)
}
