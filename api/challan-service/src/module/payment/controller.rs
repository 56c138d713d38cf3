use super::crud;
use super::schema::PaymentAction;
use crate::app::AppState;
use crate::module::error::{json_body, reject};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn handle_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentAction>, JsonRejection>,
) -> Response {
    let action = match json_body(payload) {
        Ok(action) => action,
        Err(err) => return reject(err, "payment request rejected"),
    };
    match crud::handle_payment(&state, action).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "payment request rejected"),
    }
}
