//! HTTP Handlers for the Headcount Dashboard Server
//!
//! Chart and data endpoints share one flow: derive the cache key, serve a hit
//! directly, otherwise fetch rows, render, store and return. A failed fetch never
//! reaches the cache.

use super::config::ServerConfig;
use super::types::*;
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use headcount_dashboard::charts::aggregation::{
    distinct_values, filter_session, grand_total, group_sum, session_category_totals,
};
use headcount_dashboard::metrics::METRICS_CONTENT_TYPE;
use headcount_dashboard::{
    donut_chart, request_key, trend_chart, DashboardMetrics, DonutStyle, GroupField,
    HeadcountRecord, HeadcountSource, RecordKind, ResponseCache, TrendStyle,
};
use std::sync::Arc;
use tracing::{debug, error, info};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state: record source, response cache, metrics and configuration
pub struct AppState {
    pub source: Arc<dyn HeadcountSource>,
    pub cache: ResponseCache,
    pub metrics: DashboardMetrics,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        source: Arc<dyn HeadcountSource>,
        config: ServerConfig,
    ) -> headcount_dashboard::Result<Self> {
        Ok(Self {
            source,
            cache: ResponseCache::new(config.cache_ttl()),
            metrics: DashboardMetrics::new()?,
            config,
        })
    }
}

// =============================================================================
// Cache-Wrapped Generation
// =============================================================================

/// Serve `key` from the cache, or fetch `kind` rows, render and store
async fn cached_payload<F>(
    state: &AppState,
    endpoint: &'static str,
    key: String,
    kind: RecordKind,
    faculty: Option<&str>,
    render: F,
) -> Result<String, ApiError>
where
    F: FnOnce(&[HeadcountRecord]) -> headcount_dashboard::Result<String>,
{
    if let Some(payload) = state.cache.get(&key) {
        state.metrics.record_cache_hit(endpoint);
        return Ok(payload);
    }
    state.metrics.record_cache_miss(endpoint);
    debug!(endpoint, key = %key, "Cache miss, generating");

    let records = state
        .source
        .fetch_records(kind, faculty)
        .await
        .map_err(|e| {
            state.metrics.record_fetch_error(kind);
            error!(error = %e, endpoint, kind = %kind, "Record fetch failed");
            ApiError(e)
        })?;

    let payload = render(&records).map_err(|e| {
        error!(error = %e, endpoint, "Render failed");
        ApiError(e)
    })?;

    state.cache.set(key, payload.clone());
    Ok(payload)
}

fn json_response(payload: String) -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, "application/json")], payload).into_response()
}

fn session_or_default<'a>(params: &'a SessionParams, config: &'a ServerConfig) -> &'a str {
    normalize(params.session.as_deref()).unwrap_or(&config.default_session)
}

// =============================================================================
// Housekeeping Handlers
// =============================================================================

/// Health check endpoint
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Headcount dashboard API",
        status: "healthy",
        cache_size: state.cache.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Cache occupancy
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatusResponse> {
    Json(state.cache.status().into())
}

/// Drop every cached response
pub async fn cache_clear(State(state): State<Arc<AppState>>) -> Json<CacheClearResponse> {
    let removed = state.cache.clear();
    Json(CacheClearResponse {
        message: format!("Cache cleared, removed {removed} entries"),
        removed_entries: removed,
    })
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let text = state.metrics.export()?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, METRICS_CONTENT_TYPE)], text).into_response())
}

// =============================================================================
// Chart Handlers
// =============================================================================

/// Staff positions donut for one session
pub async fn staff_donut(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Html<String>, ApiError> {
    let session = session_or_default(&params, &state.config);
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("staff_donut", Some(session), faculty);

    cached_payload(&state, "staff_donut", key, RecordKind::Staff, faculty, |records| {
        donut_chart(records, session, GroupField::Category, DonutStyle::STAFF).render()
    })
    .await
    .map(Html)
}

/// Student types donut for one session
pub async fn student_donut(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Html<String>, ApiError> {
    let session = session_or_default(&params, &state.config);
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("student_donut", Some(session), faculty);

    cached_payload(&state, "student_donut", key, RecordKind::Student, faculty, |records| {
        donut_chart(records, session, GroupField::Category, DonutStyle::STUDENT).render()
    })
    .await
    .map(Html)
}

/// Staff totals per session with highlighted positions overlaid
pub async fn staff_trend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Html<String>, ApiError> {
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("staff_trend", None, faculty);
    let highlighted = &state.config.highlighted_positions;

    cached_payload(&state, "staff_trend", key, RecordKind::Staff, faculty, |records| {
        trend_chart(records, GroupField::Category, highlighted, &TrendStyle::staff()).render()
    })
    .await
    .map(Html)
}

/// Student totals per session with one line per student type
pub async fn student_trend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Html<String>, ApiError> {
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("student_trend", None, faculty);
    let configured = &state.config.highlighted_student_types;

    cached_payload(&state, "student_trend", key, RecordKind::Student, faculty, |records| {
        let highlighted = if configured.is_empty() {
            distinct_values(records, GroupField::Category)
        } else {
            configured.clone()
        };
        trend_chart(records, GroupField::Category, &highlighted, &TrendStyle::student()).render()
    })
    .await
    .map(Html)
}

// =============================================================================
// Data API Handlers
// =============================================================================

/// Total academic staff in one session
pub async fn api_staff_count(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Response, ApiError> {
    let session = session_or_default(&params, &state.config);
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("api_staff_count", Some(session), faculty);

    cached_payload(&state, "api_staff_count", key, RecordKind::Staff, faculty, |records| {
        Ok(serde_json::to_string(&StaffCountResponse {
            session: session.to_string(),
            academic_staff_count: grand_total(filter_session(records, session)),
        })?)
    })
    .await
    .map(json_response)
}

/// Students per type in one session
pub async fn api_student_distribution(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Response, ApiError> {
    let session = session_or_default(&params, &state.config);
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("api_student_distribution", Some(session), faculty);

    cached_payload(
        &state,
        "api_student_distribution",
        key,
        RecordKind::Student,
        faculty,
        |records| {
            Ok(serde_json::to_string(&StudentDistributionResponse {
                session: session.to_string(),
                distribution: group_sum(filter_session(records, session), GroupField::Category),
            })?)
        },
    )
    .await
    .map(json_response)
}

/// Staff per `(session, position)`
pub async fn api_staff_growth(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Response, ApiError> {
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("api_staff_growth", None, faculty);

    cached_payload(&state, "api_staff_growth", key, RecordKind::Staff, faculty, |records| {
        Ok(serde_json::to_string(&StaffGrowthResponse {
            staff_growth_by_position: session_category_totals(records, GroupField::Category)
                .into_iter()
                .map(PositionTotal::from)
                .collect(),
        })?)
    })
    .await
    .map(json_response)
}

/// Students per `(session, type)`
pub async fn api_student_trend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Response, ApiError> {
    let faculty = normalize(params.faculty.as_deref());
    let key = request_key("api_student_trend", None, faculty);

    cached_payload(&state, "api_student_trend", key, RecordKind::Student, faculty, |records| {
        Ok(serde_json::to_string(&StudentTrendResponse {
            student_population_trend: session_category_totals(records, GroupField::Category)
                .into_iter()
                .map(TypeTotal::from)
                .collect(),
        })?)
    })
    .await
    .map(json_response)
}

/// Log the effective chart settings once at startup
pub fn log_chart_settings(config: &ServerConfig) {
    info!(
        default_session = %config.default_session,
        highlighted_positions = config.highlighted_positions.len(),
        highlighted_student_types = config.highlighted_student_types.len(),
        cache_ttl_seconds = config.cache_ttl_seconds,
        "Chart settings"
    );
}
