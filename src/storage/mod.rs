//! Data access for headcount records
//!
//! The relational store is an external collaborator. This module owns the only
//! place SQL text is assembled ([`SelectQuery`]) and the seam handlers fetch
//! through ([`HeadcountSource`]).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   fetch_records   ┌──────────────────┐   acquire/query   ┌──────────┐
//! │ HTTP handler │──────────────────▶│ PgHeadcountStore │──────────────────▶│  PgPool  │
//! └──────────────┘                   └──────────────────┘                   └──────────┘
//!                                             │
//!                                             ▼
//!                                      SelectQuery::build
//! ```

mod postgres;
mod query;

pub use postgres::{PgHeadcountStore, PoolConfig};
pub use query::SelectQuery;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{HeadcountRecord, RecordKind};

/// Source of headcount rows
///
/// Implementations must not retry; retry policy belongs to the caller.
#[async_trait]
pub trait HeadcountSource: Send + Sync {
    /// Fetch every row of `kind`, optionally restricted to one faculty
    async fn fetch_records(
        &self,
        kind: RecordKind,
        faculty: Option<&str>,
    ) -> Result<Vec<HeadcountRecord>>;
}
