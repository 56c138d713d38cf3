use super::crud;
use super::schema::{FineListQuery, UpsertFineRequest};
use crate::app::AppState;
use crate::module::error::reject;
use crate::service::auth_service::operator_body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn list_fines(
    State(state): State<AppState>,
    Query(query): Query<FineListQuery>,
) -> Response {
    match crud::list_fines(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list fines rejected"),
    }
}

pub async fn upsert_fine(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertFineRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "upsert fine rejected"),
    };
    match crud::upsert_fine(&state, &headers, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "upsert fine rejected"),
    }
}
