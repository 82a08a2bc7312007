//! Prometheus metrics for the dashboard
//!
//! Metrics live in a private registry owned by [`DashboardMetrics`] so tests and
//! multiple server instances never collide on global registration.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::Result;
use crate::types::RecordKind;

/// Content type for the text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0];

/// Request, cache and data-access metrics
#[derive(Clone)]
pub struct DashboardMetrics {
    registry: Registry,
    request_duration: HistogramVec,
    cache_hits: IntCounterVec,
    cache_misses: IntCounterVec,
    fetch_errors: IntCounterVec,
}

impl DashboardMetrics {
    /// Create and register every metric
    pub fn new() -> Result<Self> {
        let registry = Registry::new_custom(Some("headcount_dashboard".to_string()), None)?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Wall-clock request duration",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["route", "speed"],
        )?;
        let cache_hits = IntCounterVec::new(
            Opts::new("cache_hits_total", "Responses served from the cache"),
            &["endpoint"],
        )?;
        let cache_misses = IntCounterVec::new(
            Opts::new("cache_misses_total", "Responses rendered on a cache miss"),
            &["endpoint"],
        )?;
        let fetch_errors = IntCounterVec::new(
            Opts::new("data_fetch_errors_total", "Failed record fetches"),
            &["kind"],
        )?;

        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(fetch_errors.clone()))?;

        Ok(Self {
            registry,
            request_duration,
            cache_hits,
            cache_misses,
            fetch_errors,
        })
    }

    pub fn observe_request(&self, route: &str, speed: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[route, speed])
            .observe(seconds);
    }

    pub fn record_cache_hit(&self, endpoint: &str) {
        self.cache_hits.with_label_values(&[endpoint]).inc();
    }

    pub fn record_cache_miss(&self, endpoint: &str) {
        self.cache_misses.with_label_values(&[endpoint]).inc();
    }

    pub fn record_fetch_error(&self, kind: RecordKind) {
        self.fetch_errors.with_label_values(&[kind.name()]).inc();
    }

    /// Cache hits recorded for `endpoint`
    pub fn cache_hits(&self, endpoint: &str) -> u64 {
        self.cache_hits.with_label_values(&[endpoint]).get()
    }

    /// Cache misses recorded for `endpoint`
    pub fn cache_misses(&self, endpoint: &str) -> u64 {
        self.cache_misses.with_label_values(&[endpoint]).get()
    }

    /// Encode every metric in Prometheus text format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = DashboardMetrics::new().unwrap();
        metrics.record_cache_miss("staff_donut");
        metrics.record_cache_hit("staff_donut");
        metrics.record_cache_hit("staff_donut");

        assert_eq!(metrics.cache_hits("staff_donut"), 2);
        assert_eq!(metrics.cache_misses("staff_donut"), 1);
        assert_eq!(metrics.cache_hits("student_donut"), 0);
    }

    #[test]
    fn test_export_format() {
        let metrics = DashboardMetrics::new().unwrap();
        metrics.observe_request("/charts/staff-donut", "fast", 0.012);
        metrics.record_fetch_error(RecordKind::Student);

        let text = metrics.export().unwrap();
        assert!(text.contains("headcount_dashboard_http_request_duration_seconds"));
        assert!(text.contains(r#"route="/charts/staff-donut""#));
        assert!(text.contains(r#"headcount_dashboard_data_fetch_errors_total{kind="student"} 1"#));
    }

    #[test]
    fn test_instances_are_independent() {
        let a = DashboardMetrics::new().unwrap();
        let b = DashboardMetrics::new().unwrap();
        a.record_cache_hit("x");
        assert_eq!(b.cache_hits("x"), 0);
    }
}
