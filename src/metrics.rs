//! Prometheus metrics collection for userd.
//!
//! Tracks HTTP request throughput and latency plus domain counters for
//! greetings and user registrations. Exposed in text format on `GET /metrics`.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// HTTP requests by method, route, and status.
pub static HTTP_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// HTTP request latency by route.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Total greetings recorded via `/v1/hello`.
pub static GREETINGS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Total users registered.
pub static USERS_REGISTERED: OnceLock<IntCounter> = OnceLock::new();

/// Total users removed.
pub static USERS_REMOVED: OnceLock<IntCounter> = OnceLock::new();

/// Handler errors by error code.
pub static HANDLER_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(
        HTTP_REQUESTS,
        IntCounterVec::new(
            Opts::new("userd_http_requests_total", "HTTP requests processed"),
            &["method", "route", "status"]
        )
    );
    register!(
        REQUEST_LATENCY,
        HistogramVec::new(
            HistogramOpts::new("userd_request_duration_seconds", "HTTP request latency by route")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["route"]
        )
    );
    register!(
        GREETINGS_TOTAL,
        IntCounter::new("userd_greetings_total", "Greetings recorded")
    );
    register!(
        USERS_REGISTERED,
        IntCounter::new("userd_users_registered_total", "Users registered")
    );
    register!(
        USERS_REMOVED,
        IntCounter::new("userd_users_removed_total", "Users removed")
    );
    register!(
        HANDLER_ERRORS,
        IntCounterVec::new(
            Opts::new("userd_handler_errors_total", "Handler errors by code"),
            &["code"]
        )
    );
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

/// Record a completed HTTP request with latency.
#[inline]
pub fn record_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    if let Some(c) = HTTP_REQUESTS.get() {
        c.with_label_values(&[method, route, &status.to_string()]).inc();
    }
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[route]).observe(duration_secs);
    }
}

/// Record a greeting.
#[inline]
pub fn record_greeting() {
    if let Some(c) = GREETINGS_TOTAL.get() {
        c.inc();
    }
}

/// Record a user registration.
#[inline]
pub fn record_user_registered() {
    if let Some(c) = USERS_REGISTERED.get() {
        c.inc();
    }
}

/// Record a user removal.
#[inline]
pub fn record_user_removed() {
    if let Some(c) = USERS_REMOVED.get() {
        c.inc();
    }
}

/// Record a handler error by its code label.
#[inline]
pub fn record_handler_error(code: &str) {
    if let Some(c) = HANDLER_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}
