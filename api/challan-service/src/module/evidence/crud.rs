use super::model::{EvidenceRecord, EvidenceStatus};
use super::schema::{
    EvidenceResponse, ProcessEvidenceRequest, ProcessEvidenceResponse, UploadEvidenceQuery,
    UploadEvidenceResponse,
};
use crate::app::AppState;
use crate::infra::EVIDENCE_COLLECTION;
use crate::module::error::AppError;
use crate::module::vehicle::crud::{observe_vehicle, publish_vehicle, VehicleObservation};
use crate::module::vehicle::model::VehicleRecord;
use crate::module::violation::crud::{publish_violation, record_violation, NewViolation};
use crate::module::violation::model::{ViolationRecord, ViolationType};
use crate::service::detection_service::{
    synthetic_detection, DetectionError, DetectionResult, MediaRef,
};
use crate::service::evidence_store_service::{
    content_type_for, media_kind_for, read_evidence, save_evidence, stored_name_for,
};
use crate::service::hash_service::sha256_hex_bytes;
use crate::service::integration::Integration;
use crate::service::jurisdiction_service::normalize_plate;
use crate::service::metrics_service;
use crate::service::validation_service::non_blank;
use crate::store::{load_record, lock_store, now_unix, persist_record};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn upload_evidence(
    state: &AppState,
    query: UploadEvidenceQuery,
    bytes: &[u8],
) -> Result<UploadEvidenceResponse, AppError> {
    let file_name = non_blank(query.file_name.as_deref())
        .ok_or_else(|| AppError::bad_request("MISSING_FILE_NAME", "file_name query parameter is required"))?
        .to_string();
    let media_kind = media_kind_for(&file_name).ok_or_else(|| {
        AppError::bad_request(
            "UNSUPPORTED_MEDIA_TYPE",
            format!("{file_name} is neither a supported image nor video"),
        )
    })?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("EMPTY_EVIDENCE", "evidence body is empty"));
    }
    if bytes.len() > state.config.max_evidence_bytes {
        return Err(AppError::bad_request(
            "EVIDENCE_TOO_LARGE",
            format!("evidence exceeds {} bytes", state.config.max_evidence_bytes),
        ));
    }

    let id = Uuid::now_v7().to_string();
    let stored_name = stored_name_for(&id, &file_name);
    save_evidence(&state.config.evidence_dir, &stored_name, bytes)
        .await
        .map_err(|e| AppError::internal("EVIDENCE_WRITE_FAILED", e))?;

    let now = now_unix();
    let public_url = format!(
        "{}/v1/evidence/files/{}",
        state.config.public_api_url.trim_end_matches('/'),
        stored_name
    );
    let evidence = EvidenceRecord {
        id: id.clone(),
        file_name,
        stored_name,
        media_kind,
        public_url: public_url.clone(),
        byte_len: bytes.len() as u64,
        sha256: sha256_hex_bytes(bytes),
        status: EvidenceStatus::Uploaded,
        detection: None,
        processing_time_ms: None,
        error: None,
        created_at: now,
        updated_at: now,
    };
    {
        let mut store = lock_store(&state.store)?;
        store.evidence_by_id.insert(id.clone(), evidence.clone());
    }
    persist_record(state, EVIDENCE_COLLECTION, &id, &evidence).await;
    info!(queue_id = %id, bytes = evidence.byte_len, "evidence uploaded");

    Ok(UploadEvidenceResponse {
        success: true,
        queue_id: id,
        public_url,
        evidence,
    })
}

pub async fn get_evidence(state: &AppState, id: &str) -> Result<EvidenceResponse, AppError> {
    let cached = {
        let store = lock_store(&state.store)?;
        store.evidence_by_id.get(id).cloned()
    };
    let evidence = match cached {
        Some(e) => e,
        None => {
            let loaded: Option<EvidenceRecord> = load_record(state, EVIDENCE_COLLECTION, id).await?;
            let evidence = loaded.ok_or_else(|| {
                AppError::not_found("EVIDENCE_NOT_FOUND", format!("no evidence with id {id}"))
            })?;
            let mut store = lock_store(&state.store)?;
            store
                .evidence_by_id
                .insert(evidence.id.clone(), evidence.clone());
            evidence
        }
    };
    Ok(EvidenceResponse {
        success: true,
        evidence,
    })
}

/// Returns the stored bytes and their content type.
pub async fn read_evidence_file(
    state: &AppState,
    stored_name: &str,
) -> Result<(Vec<u8>, &'static str), AppError> {
    let bytes = read_evidence(&state.config.evidence_dir, stored_name)
        .await
        .map_err(|e| AppError::internal("EVIDENCE_READ_FAILED", e))?
        .ok_or_else(|| {
            AppError::not_found("EVIDENCE_NOT_FOUND", format!("no evidence file {stored_name}"))
        })?;
    Ok((bytes, content_type_for(stored_name)))
}

pub async fn process_evidence(
    state: &AppState,
    req: ProcessEvidenceRequest,
) -> Result<ProcessEvidenceResponse, AppError> {
    let image_url = non_blank(req.image_url.as_deref());
    let video_url = non_blank(req.video_url.as_deref());
    let media = match (image_url, video_url) {
        (Some(url), _) => MediaRef::Image(url),
        (None, Some(url)) => MediaRef::Video(url),
        (None, None) => {
            return Err(AppError::bad_request(
                "MISSING_MEDIA_URL",
                "image_url or video_url is required",
            ))
        }
    };
    let queue_id = non_blank(req.queue_id.as_deref()).map(ToOwned::to_owned);
    if let Some(id) = &queue_id {
        mark_processing(state, id).await?;
    }

    let started = Instant::now();
    let outcome = match &state.integrations.detection {
        Integration::Configured(client) => client.detect(media).await.map(|r| (r, false)),
        Integration::Unconfigured => {
            warn!(media_url = %media.url(), "AI gateway not configured; returning synthetic detection");
            metrics_service::inc_detections_mocked();
            Ok((synthetic_detection(media), true))
        }
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let (result, mock) = match outcome {
        Ok(v) => v,
        Err(e) => {
            metrics_service::inc_detections_failed();
            metrics_service::set_last_error_ts(now_unix());
            if let Some(id) = &queue_id {
                finish_evidence(state, id, None, elapsed_ms, Some(e.to_string())).await?;
            }
            return Err(detection_error(e));
        }
    };
    metrics_service::record_detection_ms(elapsed_ms);

    if let Some(id) = &queue_id {
        finish_evidence(state, id, Some(result.clone()), elapsed_ms, None).await?;
    }
    let (vehicles, violations) = ingest_detection(state, &result, queue_id.as_deref(), media.url()).await?;
    info!(
        media_url = %media.url(),
        mock,
        vehicles = result.vehicles_detected.len(),
        violations = violations.len(),
        processing_time_ms = elapsed_ms,
        "evidence processed"
    );

    Ok(ProcessEvidenceResponse {
        success: true,
        result,
        mock,
        processing_time_ms: elapsed_ms,
        vehicle_ids: vehicles.into_iter().map(|v| v.id).collect(),
        violation_ids: violations.into_iter().map(|v| v.id).collect(),
    })
}

/// Upserts every plated vehicle and opens one violation per recognised code.
async fn ingest_detection(
    state: &AppState,
    result: &DetectionResult,
    evidence_id: Option<&str>,
    evidence_url: &str,
) -> Result<(Vec<VehicleRecord>, Vec<ViolationRecord>), AppError> {
    let now = now_unix();
    let mut vehicles = Vec::new();
    let mut violations = Vec::new();
    {
        let mut store = lock_store(&state.store)?;
        for detected in &result.vehicles_detected {
            let Some(plate) = detected.plate_number.as_deref().map(normalize_plate) else {
                continue;
            };
            if plate.is_empty() {
                continue;
            }
            let observation = VehicleObservation {
                vehicle_type: Some(detected.vehicle_type.clone()),
                make: detected.make.clone(),
                color: detected.color.clone(),
                ..Default::default()
            };
            let (vehicle, created) = observe_vehicle(&mut store, &plate, observation, now);

            let mut seen: Vec<ViolationType> = Vec::new();
            for code in &detected.violations {
                let Some(violation_type) = ViolationType::parse(code).map(ViolationType::stored) else {
                    continue;
                };
                if seen.contains(&violation_type) {
                    continue;
                }
                seen.push(violation_type);
                violations.push(record_violation(
                    &mut store,
                    NewViolation {
                        plate_number: plate.clone(),
                        vehicle_id: Some(vehicle.id.clone()),
                        violation_type,
                        severity: None,
                        state: None,
                        fine_amount: None,
                        camera_id: None,
                        evidence_id: evidence_id.map(ToOwned::to_owned),
                        evidence_url: Some(evidence_url.to_string()),
                        confidence: detected.confidence,
                    },
                    state.config.default_fine_amount,
                    now,
                ));
            }
            vehicles.push((vehicle, created));
        }
    }

    for (vehicle, created) in &vehicles {
        publish_vehicle(state, vehicle, *created).await;
    }
    for violation in &violations {
        publish_violation(state, violation).await;
    }
    Ok((vehicles.into_iter().map(|(v, _)| v).collect(), violations))
}

async fn mark_processing(state: &AppState, id: &str) -> Result<(), AppError> {
    let evidence = {
        let mut store = lock_store(&state.store)?;
        let evidence = store.evidence_by_id.get_mut(id).ok_or_else(|| {
            AppError::not_found("EVIDENCE_NOT_FOUND", format!("no evidence with id {id}"))
        })?;
        evidence.status = EvidenceStatus::Processing;
        evidence.error = None;
        evidence.updated_at = now_unix();
        evidence.clone()
    };
    persist_record(state, EVIDENCE_COLLECTION, id, &evidence).await;
    Ok(())
}

async fn finish_evidence(
    state: &AppState,
    id: &str,
    detection: Option<DetectionResult>,
    elapsed_ms: u64,
    error: Option<String>,
) -> Result<(), AppError> {
    let evidence = {
        let mut store = lock_store(&state.store)?;
        let Some(evidence) = store.evidence_by_id.get_mut(id) else {
            return Ok(());
        };
        evidence.status = if error.is_some() {
            EvidenceStatus::Failed
        } else {
            EvidenceStatus::Processed
        };
        evidence.detection = detection;
        evidence.processing_time_ms = Some(elapsed_ms);
        evidence.error = error;
        evidence.updated_at = now_unix();
        evidence.clone()
    };
    persist_record(state, EVIDENCE_COLLECTION, id, &evidence).await;
    state.feed.publish_update(EVIDENCE_COLLECTION, &evidence);
    Ok(())
}

fn detection_error(err: DetectionError) -> AppError {
    match err {
        DetectionError::RateLimited(m) => AppError::too_many_requests("AI_RATE_LIMITED", m),
        DetectionError::CreditsExhausted(m) => AppError::payment_required("AI_CREDITS_EXHAUSTED", m),
        other => AppError::internal("DETECTION_FAILED", other.to_string()),
    }
}
