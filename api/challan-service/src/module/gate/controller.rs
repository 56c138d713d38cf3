use super::crud;
use super::schema::{CreateCameraRequest, CreateGateEntryRequest, CreateGateRequest, GateEntryListQuery};
use crate::app::AppState;
use crate::module::error::{json_body, reject};
use crate::service::auth_service::operator_body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn list_cameras(State(state): State<AppState>) -> Response {
    match crud::list_cameras(&state).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list cameras rejected"),
    }
}

pub async fn create_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateCameraRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "create camera rejected"),
    };
    match crud::create_camera(&state, &headers, req).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(err) => reject(err, "create camera rejected"),
    }
}

pub async fn list_gates(State(state): State<AppState>) -> Response {
    match crud::list_gates(&state).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list gates rejected"),
    }
}

pub async fn create_gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateGateRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "create gate rejected"),
    };
    match crud::create_gate(&state, &headers, req).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(err) => reject(err, "create gate rejected"),
    }
}

pub async fn list_gate_entries(
    State(state): State<AppState>,
    Query(query): Query<GateEntryListQuery>,
) -> Response {
    match crud::list_gate_entries(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list gate entries rejected"),
    }
}

pub async fn record_gate_entry(
    State(state): State<AppState>,
    payload: Result<Json<CreateGateEntryRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "gate entry rejected"),
    };
    match crud::record_gate_entry(&state, req).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(err) => reject(err, "gate entry rejected"),
    }
}
