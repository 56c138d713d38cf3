use super::schema::{DashboardStats, DashboardStatsResponse, HealthResponse};
use crate::app::AppState;
use crate::module::error::AppError;
use crate::module::evidence::model::EvidenceStatus;
use crate::module::gate::model::AccessDecision;
use crate::service::metrics_service;
use crate::store::{lock_store, StoreInner};

pub async fn dashboard_stats(state: &AppState) -> Result<DashboardStatsResponse, AppError> {
    let store = lock_store(&state.store)?;
    Ok(DashboardStatsResponse {
        success: true,
        stats: compute_stats(&store),
    })
}

/// Derived from the store on every call; nothing is cached between requests.
pub fn compute_stats(store: &StoreInner) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for challan in store.challans_by_id.values() {
        stats.total_challans += 1;
        if challan.is_paid() {
            stats.paid_challans += 1;
            stats.collected_revenue += challan.fine_amount;
        } else {
            stats.pending_challans += 1;
            stats.outstanding_revenue += challan.fine_amount;
        }
        if challan.sms_sent {
            stats.sms_sent += 1;
        }
    }

    for violation in store.violations_by_id.values() {
        stats.total_violations += 1;
        if violation.is_resolved {
            stats.resolved_violations += 1;
        } else {
            stats.unresolved_violations += 1;
        }
    }

    stats.total_vehicles = store.vehicles_by_plate.len();
    stats.blacklisted_vehicles = store
        .vehicles_by_plate
        .values()
        .filter(|v| v.is_blacklisted)
        .count();
    stats.active_cameras = store.cameras_by_id.values().filter(|c| c.is_active).count();
    stats.active_gates = store.gates_by_id.values().filter(|g| g.is_active).count();

    stats.gate_entries = store.gate_entries.len();
    for entry in &store.gate_entries {
        match entry.access_decision {
            AccessDecision::Denied => stats.denied_entries += 1,
            AccessDecision::Flagged => stats.flagged_entries += 1,
            AccessDecision::Granted => {}
        }
    }

    for evidence in store.evidence_by_id.values() {
        match evidence.status {
            EvidenceStatus::Uploaded | EvidenceStatus::Processing => stats.evidence_pending += 1,
            EvidenceStatus::Processed => stats.evidence_processed += 1,
            EvidenceStatus::Failed => stats.evidence_failed += 1,
        }
    }

    stats
}

pub fn health(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        env: state.config.rust_env.clone(),
        persistence: state.infra.is_some(),
        integrations: state.integrations.status(),
        metrics: metrics_service::snapshot(),
    }
}
