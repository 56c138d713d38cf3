use crate::app::AppState;
use crate::module::notification::controller;
use axum::routing::post;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/send-challan-sms", post(controller::send_challan_sms))
        .with_state(state)
}
