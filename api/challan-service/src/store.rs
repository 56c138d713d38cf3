use crate::app::AppState;
use crate::infra::record_key;
use crate::module::challan::model::ChallanRecord;
use crate::module::error::AppError;
use crate::module::evidence::model::EvidenceRecord;
use crate::module::fine::model::FineScheduleEntry;
use crate::module::gate::model::{CameraRecord, GateEntryRecord, GateRecord};
use crate::module::payment::model::PaymentRecord;
use crate::module::vehicle::model::VehicleRecord;
use crate::module::violation::model::{ViolationRecord, ViolationType};
use crate::service::jurisdiction_service::canonical_state;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Authoritative record store. Redis, when configured, only mirrors it.
#[derive(Debug, Default)]
pub struct BackOfficeStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
pub struct StoreInner {
    pub challans_by_id: HashMap<String, ChallanRecord>,
    pub challan_id_by_token: HashMap<String, String>,
    pub challan_id_by_number: HashMap<String, String>,
    pub payments_by_id: HashMap<String, PaymentRecord>,
    pub payment_id_by_order: HashMap<String, String>,
    pub vehicles_by_plate: HashMap<String, VehicleRecord>,
    pub violations_by_id: HashMap<String, ViolationRecord>,
    pub cameras_by_id: HashMap<String, CameraRecord>,
    pub gates_by_id: HashMap<String, GateRecord>,
    pub gate_entries: Vec<GateEntryRecord>,
    pub evidence_by_id: HashMap<String, EvidenceRecord>,
    pub fines: HashMap<String, FineScheduleEntry>,
}

impl BackOfficeStore {
    pub fn with_fines(entries: Vec<FineScheduleEntry>) -> Self {
        let mut inner = StoreInner::default();
        for entry in entries {
            inner.upsert_fine(entry);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl StoreInner {
    pub fn upsert_fine(&mut self, mut entry: FineScheduleEntry) {
        entry.state = canonical_state(&entry.state);
        entry.violation_type = entry.violation_type.stored();
        self.fines
            .insert(fine_key(&entry.state, entry.violation_type), entry);
    }

    pub fn fine_for(&self, state: &str, violation_type: ViolationType) -> Option<&FineScheduleEntry> {
        self.fines
            .get(&fine_key(&canonical_state(state), violation_type.stored()))
    }

    pub fn challan_by_token(&self, token: &str) -> Option<&ChallanRecord> {
        self.challan_id_by_token
            .get(token)
            .and_then(|id| self.challans_by_id.get(id))
    }

    pub fn insert_challan(&mut self, challan: ChallanRecord) {
        self.challan_id_by_token
            .insert(challan.public_token.clone(), challan.id.clone());
        self.challan_id_by_number
            .insert(challan.challan_number.clone(), challan.id.clone());
        self.challans_by_id.insert(challan.id.clone(), challan);
    }

    pub fn insert_payment(&mut self, payment: PaymentRecord) {
        self.payment_id_by_order
            .insert(payment.gateway_order_id.clone(), payment.id.clone());
        self.payments_by_id.insert(payment.id.clone(), payment);
    }
}

pub fn fine_key(state: &str, violation_type: ViolationType) -> String {
    format!("{}|{}", state.to_ascii_lowercase(), violation_type.as_str())
}

pub fn lock_store(store: &BackOfficeStore) -> Result<MutexGuard<'_, StoreInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_ERROR", "back-office store lock poisoned"))
}

/// Mirrors a record to Redis. Memory already holds the write, so mirror failures are logged only.
pub async fn persist_record<T: Serialize>(state: &AppState, collection: &str, id: &str, record: &T) {
    let Some(infra) = &state.infra else {
        return;
    };
    let payload = match serde_json::to_string(record) {
        Ok(p) => p,
        Err(e) => {
            warn!(collection, id, error = %e, "failed to encode record for redis mirror");
            return;
        }
    };
    let mut conn = match infra.redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!(collection, id, error = %e, "redis connect failed; record kept in memory only");
            return;
        }
    };
    let result: redis::RedisResult<()> = conn.set(record_key(collection, id), payload).await;
    if let Err(e) = result {
        warn!(collection, id, error = %e, "redis write failed; record kept in memory only");
    }
}

pub async fn persist_index(state: &AppState, key: &str, value: &str) {
    let Some(infra) = &state.infra else {
        return;
    };
    let mut conn = match infra.redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!(key, error = %e, "redis connect failed; index kept in memory only");
            return;
        }
    };
    let result: redis::RedisResult<()> = conn.set(key, value).await;
    if let Err(e) = result {
        warn!(key, error = %e, "redis index write failed");
    }
}

pub async fn load_record<T: DeserializeOwned>(
    state: &AppState,
    collection: &str,
    id: &str,
) -> Result<Option<T>, AppError> {
    let Some(raw) = load_string(state, &record_key(collection, id)).await? else {
        return Ok(None);
    };
    serde_json::from_str::<T>(&raw)
        .map(Some)
        .map_err(|e| AppError::internal("REDIS_DECODE_FAILED", e.to_string()))
}

pub async fn load_string(state: &AppState, key: &str) -> Result<Option<String>, AppError> {
    let Some(infra) = &state.infra else {
        return Ok(None);
    };
    let mut conn = infra
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::internal("REDIS_CONNECT_FAILED", e.to_string()))?;
    conn.get(key)
        .await
        .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))
}

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
