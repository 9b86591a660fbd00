use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Moodwave metrics
const PREFIX: &str = "moodwave";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Authentication
    pub static ref AUTH_LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_auth_login_attempts_total"), "Total login attempts"),
        &["status"]
    ).expect("Failed to create auth_login_attempts_total metric");

    pub static ref AUTH_LOGIN_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_auth_login_duration_seconds"),
            "Login request duration in seconds"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0])
    ).expect("Failed to create auth_login_duration_seconds metric");

    // Recommendations
    pub static ref RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_recommendations_total"),
            "Recommendation requests by outcome"
        ),
        &["outcome"]
    ).expect("Failed to create recommendations_total metric");

    pub static ref RECOMMENDATION_DROPPED_REFERENCES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_recommendation_dropped_references_total"),
        "Model recommendations dropped for pointing at no known song"
    ).expect("Failed to create recommendation_dropped_references_total metric");

    pub static ref LLM_COMPLETION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_llm_completion_duration_seconds"),
            "Duration of completion calls to the model provider"
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 40.0, 60.0]),
        &["provider", "outcome"]
    ).expect("Failed to create llm_completion_duration_seconds metric");
}

/// Registers every metric. Safe to call more than once.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_DROPPED_REFERENCES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_COMPLETION_DURATION_SECONDS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_login_attempt(status: &str, duration: Duration) {
    AUTH_LOGIN_ATTEMPTS_TOTAL.with_label_values(&[status]).inc();

    AUTH_LOGIN_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// `outcome` is "success" or the error kind.
pub fn record_recommendation(outcome: &str) {
    RECOMMENDATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_dropped_references(count: usize) {
    if count > 0 {
        RECOMMENDATION_DROPPED_REFERENCES_TOTAL.inc_by(count as f64);
    }
}

pub fn record_llm_completion(provider: &str, outcome: &str, duration: Duration) {
    LLM_COMPLETION_DURATION_SECONDS
        .with_label_values(&[provider, outcome])
        .observe(duration.as_secs_f64());
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
