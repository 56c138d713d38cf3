use crate::app::AppState;
use crate::module::fine::controller;
use axum::routing::get;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/fines",
            get(controller::list_fines).post(controller::upsert_fine),
        )
        .with_state(state)
}
