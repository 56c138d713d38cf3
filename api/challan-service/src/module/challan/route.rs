use crate::app::AppState;
use crate::module::challan::controller;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/create-challan", post(controller::create_challan))
        .route("/v1/public-challan", get(controller::get_public_challan))
        .route("/v1/challans", get(controller::list_challans))
        .route("/v1/challans/:id", get(controller::get_challan))
        .route("/v1/challans/:id/notes", post(controller::update_notes))
        .with_state(state)
}
