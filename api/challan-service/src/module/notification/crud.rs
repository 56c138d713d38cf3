use super::schema::{SendChallanSmsRequest, SendChallanSmsResponse};
use crate::app::AppState;
use crate::infra::CHALLANS_COLLECTION;
use crate::module::challan::crud::{challan_not_found, find_challan, public_url_for, save_challan};
use crate::module::challan::model::ChallanRecord;
use crate::module::error::AppError;
use crate::service::integration::Integration;
use crate::service::metrics_service;
use crate::service::sms_service::{normalize_indian_mobile, SmsMessage};
use crate::service::validation_service::non_blank;
use crate::store::{lock_store, now_unix};
use serde_json::Value;
use tracing::{info, warn};

const PHONE_KEYS: &[&str] = &["owner_mobile", "mobile_number", "mobile", "phone", "owner_contact"];

pub async fn send_challan_sms(
    state: &AppState,
    req: SendChallanSmsRequest,
) -> Result<SendChallanSmsResponse, AppError> {
    let challan_id = non_blank(req.challan_id.as_deref())
        .ok_or_else(|| AppError::bad_request("MISSING_CHALLAN_ID", "challan_id is required"))?;
    let challan = find_challan(state, challan_id).await?;
    let public_url = public_url_for(&state.config, &challan.public_token);
    let message = SmsMessage {
        challan_number: challan.challan_number.clone(),
        plate_number: challan.plate_number.clone(),
        violation_label: challan.violation_label.clone(),
        fine_amount: challan.fine_amount,
        public_url: public_url.clone(),
    };
    let text = message.render();

    match &state.integrations.sms {
        Integration::Unconfigured => {
            warn!(
                challan_number = %challan.challan_number,
                message = %text,
                "MSG91 not configured; SMS not delivered, marking sent in demo mode"
            );
            mark_sent(state, challan_id, true).await?;
            metrics_service::inc_sms_sent(true);
            Ok(SendChallanSmsResponse {
                success: true,
                mock: true,
                public_url,
                message: text,
                gateway_reference: None,
            })
        }
        Integration::Configured(client) => {
            let mobile = recipient_mobile(state, &challan)?.ok_or_else(|| {
                AppError::bad_request(
                    "MISSING_RECIPIENT_PHONE",
                    format!("no owner mobile number on challan {}", challan.challan_number),
                )
            })?;
            let reference = client
                .send(&mobile, &message)
                .await
                .map_err(|e| AppError::internal("SMS_SEND_FAILED", e))?;
            mark_sent(state, challan_id, false).await?;
            metrics_service::inc_sms_sent(false);
            info!(challan_number = %challan.challan_number, reference = %reference, "challan SMS sent");
            Ok(SendChallanSmsResponse {
                success: true,
                mock: false,
                public_url,
                message: text,
                gateway_reference: Some(reference),
            })
        }
    }
}

/// Phone from the lookup snapshot, else from the vehicle row.
fn recipient_mobile(state: &AppState, challan: &ChallanRecord) -> Result<Option<String>, AppError> {
    if let Some(mobile) = challan.vehicle_data.as_ref().and_then(snapshot_mobile) {
        return Ok(Some(mobile));
    }
    let store = lock_store(&state.store)?;
    Ok(store
        .vehicles_by_plate
        .get(&challan.plate_number)
        .and_then(|v| v.owner_contact.as_deref())
        .and_then(normalize_indian_mobile))
}

pub fn snapshot_mobile(snapshot: &Value) -> Option<String> {
    PHONE_KEYS
        .iter()
        .filter_map(|k| snapshot.get(*k).and_then(Value::as_str))
        .find_map(normalize_indian_mobile)
}

async fn mark_sent(state: &AppState, challan_id: &str, mock: bool) -> Result<(), AppError> {
    let challan = {
        let mut store = lock_store(&state.store)?;
        let challan = store
            .challans_by_id
            .get_mut(challan_id)
            .ok_or_else(|| challan_not_found(challan_id))?;
        let now = now_unix();
        challan.sms_sent = true;
        challan.sms_sent_at = Some(now);
        challan.sms_mock = mock;
        challan.updated_at = now;
        challan.clone()
    };
    save_challan(state, &challan).await;
    state.feed.publish_update(CHALLANS_COLLECTION, &challan);
    Ok(())
}
