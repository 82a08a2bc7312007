//! API request and response types

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use headcount_dashboard::charts::SessionCategoryTotal;
use headcount_dashboard::{CacheStatus, Error};
use serde::{Deserialize, Serialize};

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for session-scoped endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SessionParams {
    /// Academic session, defaults to the configured session
    #[serde(default)]
    pub session: Option<String>,
    /// Restrict rows to one faculty
    #[serde(default)]
    pub faculty: Option<String>,
}

/// Query parameters for trend endpoints
#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    #[serde(default)]
    pub faculty: Option<String>,
}

/// Trim a query value, treating blank as absent
pub fn normalize(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Housekeeping Responses
// =============================================================================

/// Root / health response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub cache_size: usize,
    pub timestamp: String,
}

/// Cache status response
#[derive(Debug, Serialize)]
pub struct CacheStatusResponse {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub cache_ttl_seconds: u64,
}

impl From<CacheStatus> for CacheStatusResponse {
    fn from(status: CacheStatus) -> Self {
        Self {
            total_entries: status.total_entries,
            active_entries: status.active_entries,
            expired_entries: status.expired_entries,
            cache_ttl_seconds: status.cache_ttl_seconds,
        }
    }
}

/// Cache clear response
#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub message: String,
    pub removed_entries: usize,
}

// =============================================================================
// Data API Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StaffCountResponse {
    pub session: String,
    pub academic_staff_count: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentDistributionResponse {
    pub session: String,
    pub distribution: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct PositionTotal {
    pub session: String,
    pub position: String,
    pub count: i64,
}

impl From<SessionCategoryTotal> for PositionTotal {
    fn from(total: SessionCategoryTotal) -> Self {
        Self {
            session: total.session,
            position: total.category,
            count: total.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TypeTotal {
    pub session: String,
    #[serde(rename = "type")]
    pub student_type: String,
    pub count: i64,
}

impl From<SessionCategoryTotal> for TypeTotal {
    fn from(total: SessionCategoryTotal) -> Self {
        Self {
            session: total.session,
            student_type: total.category,
            count: total.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StaffGrowthResponse {
    pub staff_growth_by_position: Vec<PositionTotal>,
}

#[derive(Debug, Serialize)]
pub struct StudentTrendResponse {
    pub student_population_trend: Vec<TypeTotal>,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned on failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Library error mapped onto an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_data_unavailable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
