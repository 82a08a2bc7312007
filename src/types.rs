//! Core data types used throughout the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default academic session shown by the donut charts
pub const DEFAULT_SESSION: &str = "2023/2024";

/// Which record set a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Student enrolment counts, categorised by student type
    Student,
    /// Academic staff counts, categorised by position
    Staff,
}

impl RecordKind {
    /// Underlying table name
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Student => "student",
            RecordKind::Staff => "academic_staff",
        }
    }

    /// Column holding the category for this record set
    pub fn category_column(&self) -> &'static str {
        match self {
            RecordKind::Student => "type",
            RecordKind::Staff => "position",
        }
    }

    /// Short name used in logs, metrics and cache keys
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Student => "student",
            RecordKind::Staff => "staff",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One headcount row as fetched from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HeadcountRecord {
    /// Academic session label, `YYYY/YYYY`
    pub session: String,
    /// Student type or staff position
    pub category: String,
    /// Owning faculty
    pub faculty: String,
    /// Headcount, never negative
    pub count: i64,
}

impl HeadcountRecord {
    /// Create a new record
    pub fn new(
        session: impl Into<String>,
        category: impl Into<String>,
        faculty: impl Into<String>,
        count: i64,
    ) -> Self {
        Self {
            session: session.into(),
            category: category.into(),
            faculty: faculty.into(),
            count,
        }
    }
}

/// Field a chart groups rows by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    /// The record's category (student type / staff position)
    Category,
    /// The record's faculty
    Faculty,
}

impl GroupField {
    /// Extract the grouping value from a record
    pub fn value<'a>(&self, record: &'a HeadcountRecord) -> &'a str {
        match self {
            GroupField::Category => &record.category,
            GroupField::Faculty => &record.faculty,
        }
    }
}
