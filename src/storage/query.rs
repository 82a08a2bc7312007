//! SQL text assembly for the two record sets

use crate::types::RecordKind;

/// A parameterized SELECT over one record set
///
/// Filter values only ever appear in [`SelectQuery::params`], never in the SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    sql: String,
    params: Vec<String>,
}

impl SelectQuery {
    /// Build the query for `kind`, adding an equality predicate on faculty when given
    pub fn build(kind: RecordKind, faculty: Option<&str>) -> Self {
        let mut sql = format!(
            "SELECT session, COALESCE({column}, 'Unspecified') AS category, faculty, count::BIGINT AS count FROM {table}",
            column = kind.category_column(),
            table = kind.table(),
        );
        let mut params = Vec::new();

        if let Some(faculty) = faculty.map(str::trim).filter(|f| !f.is_empty()) {
            sql.push_str(" WHERE faculty = $1");
            params.push(faculty.to_string());
        }

        Self { sql, params }
    }

    /// SQL text with `$n` placeholders
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound to the placeholders, in order
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfiltered_query_has_no_params() {
        let query = SelectQuery::build(RecordKind::Student, None);
        assert_eq!(
            query.sql(),
            "SELECT session, COALESCE(type, 'Unspecified') AS category, faculty, count::BIGINT AS count FROM student"
        );
        assert!(query.params().is_empty());

        let query = SelectQuery::build(RecordKind::Staff, None);
        assert!(query.sql().contains("COALESCE(position, 'Unspecified')"));
        assert!(query.sql().ends_with("FROM academic_staff"));
        assert!(!query.sql().contains("WHERE"));
    }

    #[test]
    fn test_faculty_filter_is_bound() {
        let query = SelectQuery::build(RecordKind::Staff, Some("Technology"));
        assert!(query.sql().ends_with(" WHERE faculty = $1"));
        assert_eq!(query.params(), &["Technology".to_string()]);
        assert!(!query.sql().contains("Technology"));
    }

    #[test]
    fn test_faculty_value_never_reaches_sql_text() {
        let hostile = "Science'; DROP TABLE student; --";
        for kind in [RecordKind::Student, RecordKind::Staff] {
            let query = SelectQuery::build(kind, Some(hostile));
            assert!(!query.sql().contains(hostile));
            assert!(!query.sql().contains("DROP"));
            assert_eq!(query.params().len(), 1);
            assert_eq!(query.params()[0], hostile);
        }
    }

    #[test]
    fn test_blank_faculty_is_ignored() {
        let query = SelectQuery::build(RecordKind::Student, Some("   "));
        assert!(!query.sql().contains("WHERE"));
        assert!(query.params().is_empty());
    }
}
