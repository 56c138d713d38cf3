use crate::app::AppState;
use crate::module::vehicle::controller;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/vehicle-lookup", post(controller::lookup_vehicle))
        .route(
            "/v1/vehicles",
            get(controller::list_vehicles).post(controller::upsert_vehicle),
        )
        .route(
            "/v1/vehicles/:plate_number/blacklist",
            post(controller::set_blacklist),
        )
        .with_state(state)
}
