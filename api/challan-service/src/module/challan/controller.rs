use super::crud;
use super::schema::{ChallanListQuery, ChallanNotesRequest, CreateChallanRequest, PublicChallanQuery};
use crate::app::AppState;
use crate::module::error::{json_body, reject};
use crate::service::auth_service::operator_body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn create_challan(
    State(state): State<AppState>,
    payload: Result<Json<CreateChallanRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "create challan rejected"),
    };
    match crud::create_challan(&state, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "create challan rejected"),
    }
}

pub async fn get_public_challan(
    State(state): State<AppState>,
    Query(query): Query<PublicChallanQuery>,
) -> Response {
    match crud::get_public_challan(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "public challan lookup rejected"),
    }
}

pub async fn list_challans(
    State(state): State<AppState>,
    Query(query): Query<ChallanListQuery>,
) -> Response {
    match crud::list_challans(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list challans rejected"),
    }
}

pub async fn get_challan(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match crud::get_challan(&state, &id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "challan lookup rejected"),
    }
}

pub async fn update_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ChallanNotesRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "challan notes rejected"),
    };
    match crud::update_notes(&state, &headers, &id, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "challan notes rejected"),
    }
}
