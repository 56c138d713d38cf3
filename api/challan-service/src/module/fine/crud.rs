use super::model::{FineQuote, FineScheduleEntry, FineSource};
use super::schema::{FineListQuery, FineListResponse, UpsertFineRequest, UpsertFineResponse};
use crate::app::AppState;
use crate::infra::FINES_COLLECTION;
use crate::module::error::AppError;
use crate::module::violation::model::ViolationType;
use crate::service::auth_service::authorize_operator;
use crate::service::jurisdiction_service::canonical_state;
use crate::store::{fine_key, lock_store, persist_record, StoreInner};
use axum::http::HeaderMap;
use tracing::info;

/// Reads the statutory fine table shipped with the service.
pub fn load_fine_schedule(path: &str) -> Result<Vec<FineScheduleEntry>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read fine schedule {path}: {e}"))?;
    serde_json::from_str::<Vec<FineScheduleEntry>>(&raw)
        .map_err(|e| format!("failed to parse fine schedule {path}: {e}"))
}

/// Custom amount wins, then the schedule entry for the jurisdiction, then the flat default.
pub fn resolve_fine(
    inner: &StoreInner,
    state: &str,
    violation_type: ViolationType,
    custom_amount: Option<i64>,
    default_amount: i64,
) -> FineQuote {
    let scheduled = inner.fine_for(state, violation_type);
    if let Some(amount) = custom_amount {
        return FineQuote {
            amount,
            section_reference: scheduled.and_then(|e| e.section_reference.clone()),
            source: FineSource::Custom,
        };
    }
    match scheduled {
        Some(entry) => FineQuote {
            amount: entry.fine_amount,
            section_reference: entry.section_reference.clone(),
            source: FineSource::Schedule,
        },
        None => FineQuote {
            amount: default_amount,
            section_reference: None,
            source: FineSource::Default,
        },
    }
}

pub async fn list_fines(state: &AppState, query: FineListQuery) -> Result<FineListResponse, AppError> {
    let wanted = query.state.as_deref().map(canonical_state);
    let store = lock_store(&state.store)?;
    let mut fines: Vec<FineScheduleEntry> = store
        .fines
        .values()
        .filter(|e| {
            wanted
                .as_deref()
                .map_or(true, |s| e.state.eq_ignore_ascii_case(s))
        })
        .cloned()
        .collect();
    fines.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then_with(|| a.violation_type.as_str().cmp(b.violation_type.as_str()))
    });

    Ok(FineListResponse {
        success: true,
        default_fine_amount: state.config.default_fine_amount,
        fines,
    })
}

pub async fn upsert_fine(
    state: &AppState,
    headers: &HeaderMap,
    req: UpsertFineRequest,
) -> Result<UpsertFineResponse, AppError> {
    let operator = authorize_operator(&state.integrations.operator_auth, headers)?;
    if req.state.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_STATE", "state is required"));
    }
    let violation_type = ViolationType::parse(&req.violation_type).ok_or_else(|| {
        AppError::bad_request(
            "INVALID_VIOLATION_TYPE",
            format!("unknown violation type `{}`", req.violation_type),
        )
    })?;
    if req.fine_amount <= 0 || req.repeat_fine_amount.is_some_and(|v| v <= 0) {
        return Err(AppError::bad_request(
            "INVALID_FINE_AMOUNT",
            "fine amounts must be positive",
        ));
    }

    let key = fine_key(&canonical_state(&req.state), violation_type.stored());
    let entry = FineScheduleEntry {
        state: req.state,
        violation_type,
        fine_amount: req.fine_amount,
        repeat_fine_amount: req.repeat_fine_amount,
        section_reference: req.section_reference,
    };
    let stored = {
        let mut store = lock_store(&state.store)?;
        store.upsert_fine(entry);
        store
            .fines
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::internal("FINE_NOT_FOUND", "fine missing after upsert"))?
    };

    persist_record(
        state,
        FINES_COLLECTION,
        &fine_key(&stored.state, stored.violation_type),
        &stored,
    )
    .await;
    info!(
        operator = %operator,
        state = %stored.state,
        violation_type = stored.violation_type.as_str(),
        fine_amount = stored.fine_amount,
        "fine schedule entry upserted"
    );

    Ok(UpsertFineResponse {
        success: true,
        fine: stored,
    })
}
