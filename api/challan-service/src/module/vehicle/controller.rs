use super::crud;
use super::schema::{BlacklistRequest, UpsertVehicleRequest, VehicleListQuery, VehicleLookupRequest};
use crate::app::AppState;
use crate::module::error::reject;
use crate::service::auth_service::operator_body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn lookup_vehicle(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VehicleLookupRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "vehicle lookup rejected"),
    };
    match crud::lookup_vehicle(&state, &headers, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "vehicle lookup rejected"),
    }
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Response {
    match crud::list_vehicles(&state, query).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "list vehicles rejected"),
    }
}

pub async fn upsert_vehicle(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertVehicleRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "upsert vehicle rejected"),
    };
    match crud::upsert_vehicle(&state, &headers, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "upsert vehicle rejected"),
    }
}

pub async fn set_blacklist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(plate_number): Path<String>,
    payload: Result<Json<BlacklistRequest>, JsonRejection>,
) -> Response {
    let req = match operator_body(&state.integrations.operator_auth, &headers, payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "blacklist update rejected"),
    };
    match crud::set_blacklist(&state, &headers, &plate_number, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "blacklist update rejected"),
    }
}
