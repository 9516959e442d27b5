//! Prometheus metrics for the poll loop
//!
//! Call [`init_metrics`] once at startup. Until then, and if registration
//! fails, every recording function is a no-op.
//!
//! - `review_watcher_polls_total{outcome}` - finished cycles by outcome
//! - `review_watcher_errors_total{kind}` - errors by taxonomy kind
//! - `review_watcher_notifications_total{result}` - delivery attempts
//! - `review_watcher_cursor` - current `from_date`

pub mod server;

use prometheus::{
    register_counter_vec, register_int_gauge, CounterVec, Encoder, IntGauge, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

use crate::error::ErrorKind;

pub use server::serve;

struct PollerMetrics {
    polls: CounterVec,
    errors: CounterVec,
    notifications: CounterVec,
    cursor: IntGauge,
}

static POLLER_METRICS: OnceLock<PollerMetrics> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Register all metrics with the default registry
///
/// Safe to call more than once; later calls do nothing.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if POLLER_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = PollerMetrics {
        polls: register_counter_vec!(
            "review_watcher_polls_total",
            "Finished poll cycles by outcome",
            &["outcome"]
        )?,
        errors: register_counter_vec!(
            "review_watcher_errors_total",
            "Errors by kind",
            &["kind"]
        )?,
        notifications: register_counter_vec!(
            "review_watcher_notifications_total",
            "Notification delivery attempts by result",
            &["result"]
        )?,
        cursor: register_int_gauge!(
            "review_watcher_cursor",
            "Current from_date cursor (unix seconds)"
        )?,
    };

    POLLER_METRICS.set(metrics).ok();
    Ok(())
}

/// Whether metrics have been registered
pub fn metrics_initialized() -> bool {
    POLLER_METRICS.get().is_some()
}

/// Encode the default registry in text exposition format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Count a finished cycle
pub fn record_poll(outcome: &str) {
    if let Some(m) = POLLER_METRICS.get() {
        m.polls.with_label_values(&[outcome]).inc();
    }
}

/// Count an error
pub fn record_error(kind: ErrorKind) {
    if let Some(m) = POLLER_METRICS.get() {
        m.errors.with_label_values(&[kind.as_str()]).inc();
    }
}

/// Count a delivery attempt
pub fn record_notification(delivered: bool) {
    if let Some(m) = POLLER_METRICS.get() {
        let result = if delivered { "delivered" } else { "failed" };
        m.notifications.with_label_values(&[result]).inc();
    }
}

/// Publish the cursor value
pub fn set_cursor(value: i64) {
    if let Some(m) = POLLER_METRICS.get() {
        m.cursor.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_metrics_initialized() {
        let _ = init_metrics();
    }

    #[test]
    fn test_init_is_idempotent() {
        ensure_metrics_initialized();
        assert!(init_metrics().is_ok());
        assert!(metrics_initialized());
    }

    #[test]
    fn test_recording_shows_up_in_exposition() {
        ensure_metrics_initialized();
        record_poll("notified");
        record_error(ErrorKind::WrongStatus);
        record_notification(true);
        set_cursor(1000);

        let text = encode_metrics().unwrap();
        assert!(text.contains("review_watcher_polls_total"));
        assert!(text.contains("WrongStatusError"));
        assert!(text.contains("review_watcher_cursor"));
    }
}
