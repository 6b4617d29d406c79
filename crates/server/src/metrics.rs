use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_http_requests_total",
        "Total HTTP requests by method and status",
        &["method", "status"]
    )
    .expect("register http_requests_total")
});

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "catalog_http_request_duration_seconds",
        "Request duration in seconds",
        &["method"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register http_request_duration")
});

pub static MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_mutations_total",
        "Successful writes by entity and action",
        &["entity", "action"]
    )
    .expect("register mutations_total")
});

pub fn record_mutation(entity: &str, action: &str) {
    MUTATIONS_TOTAL.with_label_values(&[entity, action]).inc();
}

/// Request counter and latency histogram around every route.
pub async fn track(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let timer = HTTP_REQUEST_DURATION.with_label_values(&[method.as_str()]).start_timer();
    let res = next.run(req).await;
    timer.observe_duration();
    HTTP_REQUESTS_TOTAL.with_label_values(&[method.as_str(), res.status().as_str()]).inc();
    res
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
