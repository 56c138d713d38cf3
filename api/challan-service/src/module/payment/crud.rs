use super::model::{PaymentRecord, PaymentRecordStatus};
use super::schema::{
    CreateOrderRequest, CreateOrderResponse, PaymentAction, PaymentResponse, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
use crate::app::AppState;
use crate::infra::{CHALLANS_COLLECTION, PAYMENTS_COLLECTION};
use crate::module::challan::crud::{find_challan, find_challan_by_token, save_challan};
use crate::module::challan::model::{ChallanStatus, PaymentStatus};
use crate::module::error::AppError;
use crate::service::integration::Integration;
use crate::service::metrics_service;
use crate::service::payment_gateway_service::{rupees_to_paise, CURRENCY};
use crate::service::validation_service::non_blank;
use crate::store::{lock_store, now_unix, persist_record};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn handle_payment(
    state: &AppState,
    action: PaymentAction,
) -> Result<PaymentResponse, AppError> {
    match action {
        PaymentAction::CreateOrder(req) => create_order(state, req).await.map(PaymentResponse::Order),
        PaymentAction::VerifyPayment(req) => {
            verify_payment(state, req).await.map(PaymentResponse::Verified)
        }
    }
}

pub async fn create_order(
    state: &AppState,
    req: CreateOrderRequest,
) -> Result<CreateOrderResponse, AppError> {
    let challan = match (
        non_blank(req.challan_id.as_deref()),
        non_blank(req.public_token.as_deref()),
    ) {
        (Some(id), _) => find_challan(state, id).await?,
        (None, Some(token)) => find_challan_by_token(state, token).await?,
        (None, None) => {
            return Err(AppError::bad_request(
                "MISSING_CHALLAN_REFERENCE",
                "challan_id or public_token is required",
            ))
        }
    };
    if challan.is_paid() {
        return Err(AppError::bad_request(
            "ALREADY_PAID",
            format!("challan {} is already paid", challan.challan_number),
        ));
    }

    let amount_paise = rupees_to_paise(challan.fine_amount);
    let (order_id, key_id, mock) = match &state.integrations.payments {
        Integration::Configured(client) => {
            let order = client
                .create_order(
                    amount_paise,
                    &challan.challan_number,
                    json!({
                        "challan_id": challan.id,
                        "plate_number": challan.plate_number,
                    }),
                )
                .await
                .map_err(|e| AppError::internal("PAYMENT_ORDER_FAILED", e))?;
            (order.id, Some(client.key_id.clone()), false)
        }
        Integration::Unconfigured => {
            let order_id = format!("order_mock_{}", Uuid::new_v4().simple());
            warn!(
                challan_number = %challan.challan_number,
                order_id = %order_id,
                "payment gateway not configured; issuing mock order"
            );
            (order_id, None, true)
        }
    };

    let payment = PaymentRecord {
        id: Uuid::new_v4().to_string(),
        challan_id: challan.id.clone(),
        gateway_order_id: order_id.clone(),
        amount: challan.fine_amount,
        amount_paise,
        currency: CURRENCY.to_string(),
        status: PaymentRecordStatus::Created,
        gateway_payment_id: None,
        gateway_signature: None,
        payer_name: req.payer_name,
        payer_email: req.payer_email,
        payer_phone: req.payer_phone,
        mock,
        created_at: now_unix(),
        paid_at: None,
    };
    {
        let mut store = lock_store(&state.store)?;
        store.insert_payment(payment.clone());
    }
    persist_record(state, PAYMENTS_COLLECTION, &payment.id, &payment).await;
    state.feed.publish_insert(PAYMENTS_COLLECTION, &payment);
    info!(
        challan_number = %challan.challan_number,
        order_id = %order_id,
        amount_paise,
        mock,
        "payment order created"
    );

    Ok(CreateOrderResponse {
        success: true,
        order_id,
        amount: challan.fine_amount,
        amount_paise,
        currency: CURRENCY.to_string(),
        key_id,
        challan_number: challan.challan_number,
        mock,
    })
}

/// Marks the order paid and closes the challan. Repeating the same verification is
/// a no-op success; a challan already settled by another payment is a conflict.
pub async fn verify_payment(
    state: &AppState,
    req: VerifyPaymentRequest,
) -> Result<VerifyPaymentResponse, AppError> {
    let (Some(order_id), Some(payment_id)) = (
        non_blank(req.razorpay_order_id.as_deref()),
        non_blank(req.razorpay_payment_id.as_deref()),
    ) else {
        return Err(AppError::bad_request(
            "MISSING_PAYMENT_FIELDS",
            "razorpay_order_id and razorpay_payment_id are required",
        ));
    };
    let signature = non_blank(req.razorpay_signature.as_deref()).map(ToOwned::to_owned);

    if state.config.payment_verify_signature {
        if let Integration::Configured(client) = &state.integrations.payments {
            let expected = client
                .expected_signature(order_id, payment_id)
                .map_err(|e| AppError::internal("SIGNATURE_COMPUTE_FAILED", e))?;
            if signature.as_deref() != Some(expected.as_str()) {
                return Err(AppError::bad_request(
                    "INVALID_PAYMENT_SIGNATURE",
                    "payment signature does not match",
                ));
            }
        }
    }

    let challan_id = {
        let store = lock_store(&state.store)?;
        let payment = store
            .payment_id_by_order
            .get(order_id)
            .and_then(|id| store.payments_by_id.get(id))
            .ok_or_else(|| {
                AppError::not_found("PAYMENT_NOT_FOUND", format!("no payment for order {order_id}"))
            })?;
        payment.challan_id.clone()
    };
    // Loads a challan that only lives in the mirror before the in-memory update below.
    find_challan(state, &challan_id).await?;

    let now = now_unix();
    let (payment, challan, idempotent) = {
        let mut store = lock_store(&state.store)?;
        let payment_key = store
            .payment_id_by_order
            .get(order_id)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found("PAYMENT_NOT_FOUND", format!("no payment for order {order_id}"))
            })?;
        let already_verified = store.payments_by_id.get(&payment_key).is_some_and(|p| {
            p.status == PaymentRecordStatus::Paid
                && p.gateway_payment_id.as_deref() == Some(payment_id)
        });

        let challan = store
            .challans_by_id
            .get(&challan_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("CHALLAN_NOT_FOUND", format!("no challan with id {challan_id}")))?;
        if already_verified {
            let payment = store.payments_by_id.get(&payment_key).cloned();
            match payment {
                Some(p) => (p, challan, true),
                None => {
                    return Err(AppError::internal(
                        "PAYMENT_NOT_FOUND",
                        "payment vanished during verification",
                    ))
                }
            }
        } else {
            if challan.is_paid() {
                return Err(AppError::conflict(
                    "CHALLAN_ALREADY_PAID",
                    format!(
                        "challan {} was already settled by another payment",
                        challan.challan_number
                    ),
                ));
            }

            let payment = store.payments_by_id.get_mut(&payment_key).ok_or_else(|| {
                AppError::internal("PAYMENT_NOT_FOUND", "payment vanished during verification")
            })?;
            payment.status = PaymentRecordStatus::Paid;
            payment.gateway_payment_id = Some(payment_id.to_string());
            payment.gateway_signature = signature;
            payment.paid_at = Some(now);
            let payment = payment.clone();

            let challan = store.challans_by_id.get_mut(&challan_id).ok_or_else(|| {
                AppError::internal("CHALLAN_NOT_FOUND", "challan vanished during verification")
            })?;
            challan.payment_status = PaymentStatus::Paid;
            challan.status = ChallanStatus::Closed;
            challan.paid_at = Some(now);
            challan.updated_at = now;
            (payment, challan.clone(), false)
        }
    };

    if !idempotent {
        persist_record(state, PAYMENTS_COLLECTION, &payment.id, &payment).await;
        save_challan(state, &challan).await;
        state.feed.publish_update(PAYMENTS_COLLECTION, &payment);
        state.feed.publish_update(CHALLANS_COLLECTION, &challan);
        metrics_service::inc_payments_verified();
        info!(
            challan_number = %challan.challan_number,
            order_id = %order_id,
            payment_id = %payment_id,
            "payment verified; challan closed"
        );
    }

    Ok(VerifyPaymentResponse {
        success: true,
        idempotent,
        challan_id: challan.id,
        challan_number: challan.challan_number,
        payment_id: payment_id.to_string(),
        paid_at: challan.paid_at.or(payment.paid_at).unwrap_or(now),
    })
}
