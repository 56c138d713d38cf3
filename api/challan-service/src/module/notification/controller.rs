use super::crud;
use super::schema::SendChallanSmsRequest;
use crate::app::AppState;
use crate::module::error::{json_body, reject};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn send_challan_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendChallanSmsRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "send challan sms rejected"),
    };
    match crud::send_challan_sms(&state, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "send challan sms rejected"),
    }
}
