//! Headcount Dashboard
//!
//! Backend for an institutional analytics dashboard. Student and academic-staff
//! headcounts are read from PostgreSQL, aggregated in memory and rendered as
//! Plotly chart fragments that a page embeds next to an already loaded Plotly.js.
//!
//! # Architecture
//!
//! ```text
//! request ──▶ timing middleware ──▶ handler ──▶ ResponseCache ──hit──▶ response
//!                                       │
//!                                      miss
//!                                       ▼
//!                               HeadcountSource (PgPool)
//!                                       │
//!                                       ▼
//!                           charts::{donut_chart, trend_chart}
//!                                       │
//!                                       ▼
//!                               ResponseCache::set ──▶ response
//! ```
//!
//! # Modules
//!
//! - [`storage`]: parameterized queries and the Postgres-backed record source
//! - [`charts`]: aggregation and chart document rendering
//! - [`cache`]: fixed-TTL response cache with lazy expiry
//! - [`metrics`]: Prometheus request, cache and fetch metrics
//!
//! The HTTP surface lives in the `server` binary.

pub mod cache;
pub mod charts;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod types;

pub use cache::{request_key, CacheStatus, ResponseCache};
pub use charts::{donut_chart, trend_chart, ChartDocument, DonutStyle, TrendStyle};
pub use error::{Error, Result};
pub use metrics::DashboardMetrics;
pub use storage::{HeadcountSource, PgHeadcountStore, PoolConfig, SelectQuery};
pub use types::{GroupField, HeadcountRecord, RecordKind, DEFAULT_SESSION};
