use crate::app::AppState;
use crate::module::evidence::controller;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    let max_upload = state.config.max_evidence_bytes;
    Router::new()
        .route(
            "/v1/evidence",
            post(controller::upload_evidence).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/v1/evidence/:id", get(controller::get_evidence))
        .route(
            "/v1/evidence/files/:file_name",
            get(controller::get_evidence_file),
        )
        .route("/v1/process-evidence", post(controller::process_evidence))
        .with_state(state)
}
