//! Grouping and summing over headcount rows
//!
//! All functions are pure and leave their input untouched. Groups come back in
//! key order, which for `YYYY/YYYY` session labels is also chronological.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{GroupField, HeadcountRecord};

/// Summed headcount for one `(session, category)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCategoryTotal {
    pub session: String,
    pub category: String,
    pub count: i64,
}

/// Rows whose session matches exactly
pub fn filter_session<'a>(
    records: &'a [HeadcountRecord],
    session: &'a str,
) -> impl Iterator<Item = &'a HeadcountRecord> + 'a {
    records.iter().filter(move |r| r.session == session)
}

/// Sum counts per value of `field`
pub fn group_sum<'a, I>(records: I, field: GroupField) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = &'a HeadcountRecord>,
{
    let mut groups: BTreeMap<String, i64> = BTreeMap::new();
    for record in records {
        *groups.entry(field.value(record).to_string()).or_default() += record.count;
    }
    groups
}

/// Sum of all counts
pub fn grand_total<'a, I>(records: I) -> i64
where
    I: IntoIterator<Item = &'a HeadcountRecord>,
{
    records.into_iter().map(|r| r.count).sum()
}

/// Total count per session, sessions in sorted order
pub fn session_totals(records: &[HeadcountRecord]) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.session.clone()).or_default() += record.count;
    }
    totals
}

/// Total count per `(session, field value)`, sorted by session then value
pub fn session_category_totals(
    records: &[HeadcountRecord],
    field: GroupField,
) -> Vec<SessionCategoryTotal> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for record in records {
        *totals
            .entry((record.session.clone(), field.value(record).to_string()))
            .or_default() += record.count;
    }

    totals
        .into_iter()
        .map(|((session, category), count)| SessionCategoryTotal {
            session,
            category,
            count,
        })
        .collect()
}

/// Distinct session labels in sorted order
pub fn sorted_sessions(records: &[HeadcountRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.session.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct values of `field` in sorted order
pub fn distinct_values(records: &[HeadcountRecord], field: GroupField) -> Vec<String> {
    records
        .iter()
        .map(|r| field.value(r).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
