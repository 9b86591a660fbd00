//! Random latency for exercising client loading states

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

const MEAN_DELAY_MS: f64 = 1000.0;
const DELAY_STD_DEV_MS: f64 = 2000.0;

/// Delays the request by a gaussian amount of milliseconds, clamped at zero.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> Response {
    let delay_ms = match Normal::new(MEAN_DELAY_MS, DELAY_STD_DEV_MS) {
        Ok(normal) => 0.0f64.max(normal.sample(&mut rand::rng())),
        Err(_) => MEAN_DELAY_MS,
    };

    tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
    next.run(request).await
}
