use crate::app::AppState;
use crate::module::realtime::controller;
use axum::routing::get;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/realtime", get(controller::stream_inserts))
        .with_state(state)
}
