use super::crud;
use super::schema::{ProcessEvidenceRequest, UploadEvidenceQuery};
use crate::app::AppState;
use crate::module::error::{json_body, reject};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn upload_evidence(
    State(state): State<AppState>,
    Query(query): Query<UploadEvidenceQuery>,
    body: Bytes,
) -> Response {
    match crud::upload_evidence(&state, query, &body).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(err) => reject(err, "evidence upload rejected"),
    }
}

pub async fn get_evidence(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match crud::get_evidence(&state, &id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "evidence lookup rejected"),
    }
}

pub async fn get_evidence_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Response {
    match crud::read_evidence_file(&state, &file_name).await {
        Ok((bytes, content_type)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(err) => reject(err, "evidence file lookup rejected"),
    }
}

pub async fn process_evidence(
    State(state): State<AppState>,
    payload: Result<Json<ProcessEvidenceRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(err) => return reject(err, "process evidence rejected"),
    };
    match crud::process_evidence(&state, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => reject(err, "process evidence rejected"),
    }
}
