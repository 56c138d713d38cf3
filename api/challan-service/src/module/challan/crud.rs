use super::model::{ChallanRecord, ChallanStatus, PaymentStatus};
use super::schema::{
    ChallanListQuery, ChallanListResponse, ChallanNotesRequest, ChallanResponse,
    CreateChallanRequest, CreateChallanResponse, PublicChallanQuery, PublicChallanResponse,
    PublicChallanView,
};
use crate::app::AppState;
use crate::config::environment::AppConfig;
use crate::infra::{record_key, CHALLANS_COLLECTION};
use crate::module::error::AppError;
use crate::module::fine::crud::resolve_fine;
use crate::module::violation::crud::{parse_severity, parse_violation_type};
use crate::service::auth_service::authorize_operator;
use crate::service::challan_number_service::{generate_challan_number, generate_public_token};
use crate::service::jurisdiction_service::{canonical_state, challan_prefix, normalize_plate};
use crate::service::metrics_service;
use crate::service::validation_service::{non_blank, validate_plate};
use crate::store::{
    load_record, load_string, lock_store, now_millis, now_unix, persist_index, persist_record,
    StoreInner,
};
use axum::http::HeaderMap;
use tracing::info;
use uuid::Uuid;

const MAX_NUMBER_ATTEMPTS: usize = 5;

pub async fn create_challan(
    state: &AppState,
    req: CreateChallanRequest,
) -> Result<CreateChallanResponse, AppError> {
    let (Some(raw_plate), Some(raw_type), Some(raw_state)) = (
        non_blank(req.plate_number.as_deref()),
        non_blank(req.violation_type.as_deref()),
        non_blank(req.state.as_deref()),
    ) else {
        return Err(AppError::internal(
            "MISSING_REQUIRED_FIELDS",
            "Missing required fields: plate_number, violation_type, state",
        ));
    };
    validate_plate(raw_plate)?;
    let violation_type = parse_violation_type(raw_type)?;
    if req.custom_fine_amount.is_some_and(|f| f <= 0) {
        return Err(AppError::bad_request(
            "INVALID_FINE_AMOUNT",
            "custom_fine_amount must be positive",
        ));
    }
    let severity = match non_blank(req.severity.as_deref()) {
        Some(raw) => parse_severity(raw)?,
        None => violation_type.default_severity(),
    };

    let plate = normalize_plate(raw_plate);
    let jurisdiction = canonical_state(raw_state);
    let prefix = challan_prefix(raw_state);
    let violation_label = non_blank(req.violation_label.as_deref())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| violation_type.default_label().to_string());

    let challan = {
        let mut store = lock_store(&state.store)?;
        let fine = resolve_fine(
            &store,
            &jurisdiction,
            violation_type,
            req.custom_fine_amount,
            state.config.default_fine_amount,
        );
        let (challan_number, public_token) = unique_identifiers(&store, &prefix)?;
        let vehicle_id = non_blank(req.vehicle_id.as_deref())
            .map(ToOwned::to_owned)
            .or_else(|| store.vehicles_by_plate.get(&plate).map(|v| v.id.clone()));
        let now = now_unix();

        let challan = ChallanRecord {
            id: Uuid::new_v4().to_string(),
            challan_number,
            plate_number: plate,
            violation_type: violation_type.stored(),
            violation_label,
            state: jurisdiction,
            section_reference: fine.section_reference,
            fine_amount: fine.amount,
            status: ChallanStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            public_token,
            sms_sent: false,
            sms_sent_at: None,
            sms_mock: false,
            image_url: req.image_url,
            video_url: req.video_url,
            evidence_urls: req.evidence_urls,
            vehicle_data: req.vehicle_data,
            ai_detection_data: req.ai_detection_data,
            severity,
            vehicle_id,
            violation_id: req.violation_id,
            issued_by: req.issued_by,
            admin_notes: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
        };
        store.insert_challan(challan.clone());
        challan
    };

    save_challan(state, &challan).await;
    persist_index(state, &token_key(&challan.public_token), &challan.id).await;
    state.feed.publish_insert(CHALLANS_COLLECTION, &challan);
    metrics_service::inc_challans_issued();

    let public_url = public_url_for(&state.config, &challan.public_token);
    info!(
        challan_number = %challan.challan_number,
        plate = %challan.plate_number,
        violation_type = challan.violation_type.as_str(),
        state = %challan.state,
        fine_amount = challan.fine_amount,
        "challan issued"
    );
    Ok(CreateChallanResponse {
        success: true,
        fine_amount: challan.fine_amount,
        challan_number: challan.challan_number.clone(),
        public_url,
        challan,
    })
}

pub async fn get_public_challan(
    state: &AppState,
    query: PublicChallanQuery,
) -> Result<PublicChallanResponse, AppError> {
    let token = non_blank(query.token.as_deref())
        .ok_or_else(|| AppError::bad_request("MISSING_TOKEN", "token is required"))?;
    let challan = find_challan_by_token(state, token).await?;
    Ok(PublicChallanResponse {
        success: true,
        challan: public_view(&challan),
    })
}

pub async fn list_challans(
    state: &AppState,
    query: ChallanListQuery,
) -> Result<ChallanListResponse, AppError> {
    let plate = query.plate_number.as_deref().map(normalize_plate);
    let status = query.status.as_deref().map(str::to_ascii_lowercase);
    let store = lock_store(&state.store)?;
    let mut challans: Vec<ChallanRecord> = store
        .challans_by_id
        .values()
        .filter(|c| plate.as_deref().map_or(true, |p| c.plate_number == p))
        .filter(|c| {
            status.as_deref().map_or(true, |s| match s {
                "pending" => c.status == ChallanStatus::Pending,
                "closed" => c.status == ChallanStatus::Closed,
                "paid" => c.is_paid(),
                "unpaid" => !c.is_paid(),
                _ => true,
            })
        })
        .cloned()
        .collect();
    challans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ChallanListResponse {
        success: true,
        challans,
    })
}

pub async fn get_challan(state: &AppState, id: &str) -> Result<ChallanResponse, AppError> {
    Ok(ChallanResponse {
        success: true,
        challan: find_challan(state, id).await?,
    })
}

/// Administrative notes are the only field that may change on a closed challan.
pub async fn update_notes(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    req: ChallanNotesRequest,
) -> Result<ChallanResponse, AppError> {
    let operator = authorize_operator(&state.integrations.operator_auth, headers)?;
    find_challan(state, id).await?;
    let challan = {
        let mut store = lock_store(&state.store)?;
        let challan = store.challans_by_id.get_mut(id).ok_or_else(|| challan_not_found(id))?;
        challan.admin_notes = non_blank(Some(req.notes.as_str())).map(ToOwned::to_owned);
        challan.updated_at = now_unix();
        challan.clone()
    };
    save_challan(state, &challan).await;
    state.feed.publish_update(CHALLANS_COLLECTION, &challan);
    info!(challan_number = %challan.challan_number, operator = %operator, "challan notes updated");
    Ok(ChallanResponse {
        success: true,
        challan,
    })
}

/// Memory first, then the Redis mirror; a mirror hit is warmed back into memory.
pub async fn find_challan(state: &AppState, id: &str) -> Result<ChallanRecord, AppError> {
    {
        let store = lock_store(&state.store)?;
        if let Some(challan) = store.challans_by_id.get(id) {
            return Ok(challan.clone());
        }
    }
    let loaded: Option<ChallanRecord> = load_record(state, CHALLANS_COLLECTION, id).await?;
    let challan = loaded.ok_or_else(|| challan_not_found(id))?;
    warm_challan(state, &challan)?;
    Ok(challan)
}

pub async fn find_challan_by_token(state: &AppState, token: &str) -> Result<ChallanRecord, AppError> {
    {
        let store = lock_store(&state.store)?;
        if let Some(challan) = store.challan_by_token(token) {
            return Ok(challan.clone());
        }
    }
    let Some(id) = load_string(state, &token_key(token)).await? else {
        return Err(AppError::not_found("CHALLAN_NOT_FOUND", "no challan for this token"));
    };
    find_challan(state, &id).await
}

pub async fn save_challan(state: &AppState, challan: &ChallanRecord) {
    persist_record(state, CHALLANS_COLLECTION, &challan.id, challan).await;
}

pub fn public_url_for(config: &AppConfig, token: &str) -> String {
    format!(
        "{}/challan/{}",
        config.public_app_url.trim_end_matches('/'),
        token
    )
}

pub fn public_view(challan: &ChallanRecord) -> PublicChallanView {
    PublicChallanView {
        challan_number: challan.challan_number.clone(),
        plate_number: challan.plate_number.clone(),
        violation_type: challan.violation_type.as_str().to_string(),
        violation_label: challan.violation_label.clone(),
        state: challan.state.clone(),
        section_reference: challan.section_reference.clone(),
        fine_amount: challan.fine_amount,
        status: challan.status,
        payment_status: challan.payment_status,
        image_url: challan.image_url.clone(),
        issued_at: challan.created_at,
        paid_at: challan.paid_at,
    }
}

pub fn challan_not_found(id: &str) -> AppError {
    AppError::not_found("CHALLAN_NOT_FOUND", format!("no challan with id {id}"))
}

fn token_key(token: &str) -> String {
    record_key(CHALLANS_COLLECTION, &format!("token:{token}"))
}

fn warm_challan(state: &AppState, challan: &ChallanRecord) -> Result<(), AppError> {
    let mut store = lock_store(&state.store)?;
    if !store.challans_by_id.contains_key(&challan.id) {
        store.insert_challan(challan.clone());
    }
    Ok(())
}

/// Regenerates on collision with an existing number or token.
fn unique_identifiers(store: &StoreInner, prefix: &str) -> Result<(String, String), AppError> {
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let number = generate_challan_number(prefix, now_millis());
        let token = generate_public_token();
        if !store.challan_id_by_number.contains_key(&number)
            && !store.challan_id_by_token.contains_key(&token)
        {
            return Ok((number, token));
        }
    }
    Err(AppError::internal(
        "CHALLAN_NUMBER_EXHAUSTED",
        "could not allocate a unique challan number",
    ))
}
