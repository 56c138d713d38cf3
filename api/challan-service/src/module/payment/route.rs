use crate::app::AppState;
use crate::module::payment::controller;
use axum::routing::post;
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/razorpay-payment", post(controller::handle_payment))
        .with_state(state)
}
