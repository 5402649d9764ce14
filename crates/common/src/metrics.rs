use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "account_service_requests_total",
        "Account API requests by operation and response status",
        &["operation", "status"]
    )
    .expect("register requests_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "account_service_store_errors_total",
        "Document store failures by operation",
        &["operation"]
    )
    .expect("register store_errors_total")
});

pub static STORE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "account_service_store_duration_seconds",
        "Document store call duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register store_duration")
});

pub fn record_request(operation: &str, status: u16) {
    let status = status.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[operation, status.as_str()])
        .inc();
}

pub fn record_store_error(operation: &str) {
    STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
