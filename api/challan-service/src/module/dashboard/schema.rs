use crate::service::integration::IntegrationStatus;
use crate::service::metrics_service::MetricsSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DashboardStats {
    pub total_challans: usize,
    pub pending_challans: usize,
    pub paid_challans: usize,
    pub collected_revenue: i64,
    pub outstanding_revenue: i64,
    pub sms_sent: usize,
    pub total_violations: usize,
    pub unresolved_violations: usize,
    pub resolved_violations: usize,
    pub total_vehicles: usize,
    pub blacklisted_vehicles: usize,
    pub active_cameras: usize,
    pub active_gates: usize,
    pub gate_entries: usize,
    pub denied_entries: usize,
    pub flagged_entries: usize,
    pub evidence_pending: usize,
    pub evidence_processed: usize,
    pub evidence_failed: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardStatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub env: String,
    pub persistence: bool,
    pub integrations: IntegrationStatus,
    pub metrics: MetricsSnapshot,
}
