use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static CHALLANS_ISSUED: AtomicU64 = AtomicU64::new(0);
static DETECTIONS_RUN: AtomicU64 = AtomicU64::new(0);
static DETECTIONS_FAILED: AtomicU64 = AtomicU64::new(0);
static DETECTIONS_MOCKED: AtomicU64 = AtomicU64::new(0);
static LOOKUPS_MOCKED: AtomicU64 = AtomicU64::new(0);
static SMS_SENT: AtomicU64 = AtomicU64::new(0);
static SMS_MOCKED: AtomicU64 = AtomicU64::new(0);
static PAYMENTS_VERIFIED: AtomicU64 = AtomicU64::new(0);

static DETECTION_DURATION_TOTAL_MS: AtomicU64 = AtomicU64::new(0);

static LAST_ERROR_TS: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub challans_issued: u64,
    pub detections_run: u64,
    pub detections_failed: u64,
    pub detections_mocked: u64,
    pub lookups_mocked: u64,
    pub sms_sent: u64,
    pub sms_mocked: u64,
    pub payments_verified: u64,
    pub detection_avg_ms: u64,
    pub last_error_ts: i64,
}

pub fn inc_challans_issued() {
    CHALLANS_ISSUED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_detections_failed() {
    DETECTIONS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_detections_mocked() {
    DETECTIONS_MOCKED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_lookups_mocked() {
    LOOKUPS_MOCKED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sms_sent(mock: bool) {
    SMS_SENT.fetch_add(1, Ordering::Relaxed);
    if mock {
        SMS_MOCKED.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_payments_verified() {
    PAYMENTS_VERIFIED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_detection_ms(duration_ms: u64) {
    DETECTIONS_RUN.fetch_add(1, Ordering::Relaxed);
    DETECTION_DURATION_TOTAL_MS.fetch_add(duration_ms, Ordering::Relaxed);
}

pub fn set_last_error_ts(ts: i64) {
    LAST_ERROR_TS.store(ts, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    let detections_run = DETECTIONS_RUN.load(Ordering::Relaxed);

    MetricsSnapshot {
        challans_issued: CHALLANS_ISSUED.load(Ordering::Relaxed),
        detections_run,
        detections_failed: DETECTIONS_FAILED.load(Ordering::Relaxed),
        detections_mocked: DETECTIONS_MOCKED.load(Ordering::Relaxed),
        lookups_mocked: LOOKUPS_MOCKED.load(Ordering::Relaxed),
        sms_sent: SMS_SENT.load(Ordering::Relaxed),
        sms_mocked: SMS_MOCKED.load(Ordering::Relaxed),
        payments_verified: PAYMENTS_VERIFIED.load(Ordering::Relaxed),
        detection_avg_ms: if detections_run > 0 {
            DETECTION_DURATION_TOTAL_MS.load(Ordering::Relaxed) / detections_run
        } else {
            0
        },
        last_error_ts: LAST_ERROR_TS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_average_divides_by_runs() {
        let before = snapshot();
        record_detection_ms(100);
        record_detection_ms(300);
        let after = snapshot();

        assert_eq!(after.detections_run - before.detections_run, 2);
        if before.detections_run == 0 {
            assert_eq!(after.detection_avg_ms, 200);
        }
    }
}
