use super::crud;
use crate::app::AppState;
use crate::module::error::reject;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn dashboard_stats(State(state): State<AppState>) -> Response {
    match crud::dashboard_stats(&state).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "dashboard stats rejected"),
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(crud::health(&state))).into_response()
}
