use super::crud;
use super::schema::{CreateViolationRequest, ResolveViolationRequest, ViolationListQuery};
use crate::app::AppState;
use crate::module::error::reject;
use crate::service::auth_service::operator_body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn list_violations(
    State(state): State<AppState>,
    Query(query): Query<ViolationListQuery>,
) -> Response {
    match crud::list_violations(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list violations rejected"),
    }
}

pub async fn create_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateViolationRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "create violation rejected"),
    };
    match crud::create_violation(&state, &headers, req).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(err) => reject(err, "create violation rejected"),
    }
}

pub async fn resolve_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(violation_id): Path<String>,
    payload: Result<Json<ResolveViolationRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "resolve violation rejected"),
    };
    match crud::resolve_violation(&state, &headers, &violation_id, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "resolve violation rejected"),
    }
}
