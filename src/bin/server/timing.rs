//! Request timing middleware
//!
//! Measures each request, stamps `X-Process-Time` and `X-Server-Info`, logs at a
//! severity chosen by duration and records the latency histogram. Status and
//! body pass through untouched.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::handlers::AppState;

pub const PROCESS_TIME_HEADER: &str = "x-process-time";
pub const SERVER_INFO_HEADER: &str = "x-server-info";

/// Value of `X-Server-Info`
pub const SERVER_INFO: &str = concat!("headcount-dashboard/", env!("CARGO_PKG_VERSION"));

const SLOW_THRESHOLD: Duration = Duration::from_secs(2);
const MEDIUM_THRESHOLD: Duration = Duration::from_secs(1);

/// Latency class of a finished request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSpeed {
    /// Over 2 seconds
    Slow,
    /// Over 1 second
    Medium,
    Fast,
}

impl RequestSpeed {
    pub fn classify(elapsed: Duration) -> Self {
        if elapsed > SLOW_THRESHOLD {
            RequestSpeed::Slow
        } else if elapsed > MEDIUM_THRESHOLD {
            RequestSpeed::Medium
        } else {
            RequestSpeed::Fast
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSpeed::Slow => "slow",
            RequestSpeed::Medium => "medium",
            RequestSpeed::Fast => "fast",
        }
    }
}

/// `X-Process-Time` value: seconds with four decimals
pub fn format_process_time(elapsed: Duration) -> String {
    format!("{:.4}", elapsed.as_secs_f64())
}

pub async fn request_timing(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed();

    let speed = RequestSpeed::classify(elapsed);
    let seconds = elapsed.as_secs_f64();
    let status = response.status().as_u16();

    match speed {
        RequestSpeed::Slow => {
            warn!(%method, %path, status, seconds, "Slow request")
        }
        RequestSpeed::Medium => {
            info!(%method, %path, status, seconds, "Medium request")
        }
        RequestSpeed::Fast => {
            debug!(%method, %path, status, seconds, "Fast request")
        }
    }

    state.metrics.observe_request(&route, speed.as_str(), seconds);

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format_process_time(elapsed)) {
        headers.insert(PROCESS_TIME_HEADER, value);
    }
    headers.insert(SERVER_INFO_HEADER, HeaderValue::from_static(SERVER_INFO));

    response
}
