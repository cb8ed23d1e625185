//! Prometheus metrics collection for appbridge.
//!
//! Metrics live in a crate registry and stay unregistered until [`init`] is
//! called. Every `record_*` helper is a no-op before that, so the core never
//! depends on metrics being wired up. Exporting the registry is left to the
//! embedding bridge (see [`gather_metrics`]).
//!
//! - `appbridge_actor_actions_total{action}` - Actor actions attempted
//! - `appbridge_actor_action_duration_seconds{action}` - Action latency
//! - `appbridge_actor_errors_total{action,error}` - Failed actions
//! - `appbridge_join_escalations_total{step,result}` - Join fallback steps
//! - `appbridge_power_escalations_total{result}` - Power level escalations
//! - `appbridge_cache_requests_total{result}` - Request cache lookups
//! - `appbridge_queue_pending` - Events waiting in ordering queues
//! - `appbridge_state_fetch_retries_total` - Retried initial state fetches
//! - `appbridge_tracked_rooms` - Rooms held by state trackers

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Crate registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Actor Metrics
// ========================================================================

/// Actor actions attempted, by action name.
pub static ACTOR_ACTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Actor action latency, by action name.
pub static ACTOR_ACTION_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Actor action failures, by action name and error code.
pub static ACTOR_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Join escalation steps, by step and outcome.
pub static JOIN_ESCALATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Power level escalations, by outcome.
pub static POWER_ESCALATIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Cache / Queue / State Metrics
// ========================================================================

/// Request cache lookups: hit, miss, error.
pub static CACHE_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Events pushed but not yet handed to the consumer.
pub static QUEUE_PENDING: OnceLock<IntGauge> = OnceLock::new();

/// Initial state fetches retried after a transient failure.
pub static STATE_FETCH_RETRIES: OnceLock<IntCounter> = OnceLock::new();

/// Rooms currently tracked.
pub static TRACKED_ROOMS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize and register all metrics.
///
/// Safe to call more than once; later calls leave the first set in place.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(ACTOR_ACTIONS, IntCounterVec::new(Opts::new("appbridge_actor_actions_total", "Actor actions attempted"), &["action"]));
    register!(ACTOR_ACTION_LATENCY, HistogramVec::new(
        HistogramOpts::new("appbridge_actor_action_duration_seconds", "Actor action latency")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["action"]));
    register!(ACTOR_ERRORS, IntCounterVec::new(Opts::new("appbridge_actor_errors_total", "Actor action failures"), &["action", "error"]));
    register!(JOIN_ESCALATIONS, IntCounterVec::new(Opts::new("appbridge_join_escalations_total", "Join escalation steps"), &["step", "result"]));
    register!(POWER_ESCALATIONS, IntCounterVec::new(Opts::new("appbridge_power_escalations_total", "Power level escalations"), &["result"]));

    register!(CACHE_REQUESTS, IntCounterVec::new(Opts::new("appbridge_cache_requests_total", "Request cache lookups"), &["result"]));
    register!(QUEUE_PENDING, IntGauge::new("appbridge_queue_pending", "Events waiting in ordering queues"));
    register!(STATE_FETCH_RETRIES, IntCounter::new("appbridge_state_fetch_retries_total", "Retried initial state fetches"));
    register!(TRACKED_ROOMS, IntGauge::new("appbridge_tracked_rooms", "Rooms held by state trackers"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

pub fn record_action(action: &str, duration_secs: f64) {
    if let Some(c) = ACTOR_ACTIONS.get() {
        c.with_label_values(&[action]).inc();
    }
    if let Some(h) = ACTOR_ACTION_LATENCY.get() {
        h.with_label_values(&[action]).observe(duration_secs);
    }
}

pub fn record_action_error(action: &str, error: &str) {
    if let Some(c) = ACTOR_ERRORS.get() {
        c.with_label_values(&[action, error]).inc();
    }
}

pub fn record_join_step(step: &str, result: &str) {
    if let Some(c) = JOIN_ESCALATIONS.get() {
        c.with_label_values(&[step, result]).inc();
    }
}

pub fn record_power_escalation(result: &str) {
    if let Some(c) = POWER_ESCALATIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

pub fn record_cache(result: &str) {
    if let Some(c) = CACHE_REQUESTS.get() {
        c.with_label_values(&[result]).inc();
    }
}

pub fn queue_pending_add(delta: i64) {
    if let Some(g) = QUEUE_PENDING.get() {
        g.add(delta);
    }
}

pub fn record_state_retry() {
    if let Some(c) = STATE_FETCH_RETRIES.get() {
        c.inc();
    }
}

pub fn tracked_rooms_add(delta: i64) {
    if let Some(g) = TRACKED_ROOMS.get() {
        g.add(delta);
    }
}
