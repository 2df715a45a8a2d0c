//! Structured query expressions understood by every data source.
//!
//! The vocabulary covers equality and array-membership
//! filters, a current-week time window, whole-result and grouped counts,
//! ordering and limit/offset. The SurrealDB gateway renders a [`Query`] to
//! SurrealQL with bound parameters; the in-memory gateway evaluates it.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Time windows are evaluated against the data source's own clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Same ISO week (ISO year and week number) as "now"
    CurrentWeek,
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// Link to a record, given by its full id (`table:key`)
    Record(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, operand: Operand },
    /// The field is an array containing the operand
    Contains { field: String, operand: Operand },
    Within { field: String, window: TimeWindow },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Fields(Vec<String>),
    /// One row: `{ "count": n }`
    Count,
    /// One row per distinct value: `{ "key": value, "count": n }`.
    /// Array fields are split so every element is counted on its own.
    CountBy(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub projection: Projection,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
    pub start: Option<usize>,
}

impl Query {
    pub fn builder(collection: &str) -> QueryBuilder {
        QueryBuilder {
            query: Query {
                collection: collection.to_string(),
                projection: Projection::All,
                filters: Vec::new(),
                order_by: None,
                limit: None,
                start: None,
            },
        }
    }
}

pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.query.projection = Projection::Fields(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn count(mut self) -> Self {
        self.query.projection = Projection::Count;
        self
    }

    pub fn count_by(mut self, field: &str) -> Self {
        self.query.projection = Projection::CountBy(field.to_string());
        self
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Eq {
            field: field.to_string(),
            operand: Operand::Literal(value.into()),
        });
        self
    }

    pub fn filter_eq_record(mut self, field: &str, record_id: &str) -> Self {
        self.query.filters.push(Filter::Eq {
            field: field.to_string(),
            operand: Operand::Record(record_id.to_string()),
        });
        self
    }

    pub fn filter_contains_record(mut self, field: &str, record_id: &str) -> Self {
        self.query.filters.push(Filter::Contains {
            field: field.to_string(),
            operand: Operand::Record(record_id.to_string()),
        });
        self
    }

    pub fn within_current_week(mut self, field: &str) -> Self {
        self.query.filters.push(Filter::Within { field: field.to_string(), window: TimeWindow::CurrentWeek });
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.query.order_by = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.query.start = Some(start);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Splits a record id into its table and key. Keys wrapped in `⟨⟩` are unwrapped.
pub fn split_record_id(id: &str) -> Option<(&str, &str)> {
    let (table, key) = id.split_once(':')?;
    if table.is_empty() || key.is_empty() {
        return None;
    }
    let key = key
        .strip_prefix('⟨')
        .and_then(|k| k.strip_suffix('⟩'))
        .unwrap_or(key);
    Some((table, key))
}

/// Full record id for a path parameter that may be a bare key or `table:key`
pub fn record_id(table: &str, key_or_id: &str) -> String {
    if key_or_id.contains(':') {
        key_or_id.to_string()
    } else {
        format!("{}:{}", table, key_or_id)
    }
}

/// Reads the result of a [`Projection::Count`] query. An empty result or a
/// missing `count` field means zero.
pub fn read_count(rows: &[Value]) -> u64 {
    rows.first()
        .and_then(|row| row.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Reads the result of a [`Projection::CountBy`] query into a map keyed by
/// the grouped value rendered as a string. Rows without a key are skipped.
pub fn read_group_counts(rows: &[Value]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for row in rows {
        let key = match row.get("key") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => continue,
            Some(other) => other.to_string(),
        };
        let count = row.get("count").and_then(Value::as_u64).unwrap_or(0);
        *counts.entry(key).or_insert(0) += count;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_key_or_full_id() {
        assert_eq!(record_id("RecordedUser", "alice"), "RecordedUser:alice");
        assert_eq!(record_id("RecordedUser", "RecordedUser:alice"), "RecordedUser:alice");
    }

    #[test]
    fn test_builder_collects_clauses() {
        let query = Query::builder("Match")
            .filter_contains_record("participants", "RecordedUser:alice")
            .within_current_week("created_at")
            .count()
            .build();

        assert_eq!(query.collection, "Match");
        assert_eq!(query.projection, Projection::Count);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(
            query.filters[0],
            Filter::Contains {
                field: "participants".to_string(),
                operand: Operand::Record("RecordedUser:alice".to_string()),
            }
        );
        assert_eq!(
            query.filters[1],
            Filter::Within { field: "created_at".to_string(), window: TimeWindow::CurrentWeek }
        );
    }

    #[test]
    fn test_builder_paging() {
        let query = Query::builder("RecordedUser")
            .order_by("name", SortOrder::Desc)
            .limit(10)
            .start(20)
            .build();
        assert_eq!(query.order_by, Some(("name".to_string(), SortOrder::Desc)));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.start, Some(20));
        assert_eq!(query.projection, Projection::All);
    }

    #[test]
    fn test_split_record_id() {
        assert_eq!(split_record_id("RecordedUser:alice"), Some(("RecordedUser", "alice")));
        assert_eq!(split_record_id("user:⟨a-b⟩"), Some(("user", "a-b")));
        assert_eq!(split_record_id("Match:"), None);
        assert_eq!(split_record_id("nocolon"), None);
    }

    #[test]
    fn test_read_count() {
        assert_eq!(read_count(&[json!({ "count": 42 })]), 42);
        assert_eq!(read_count(&[]), 0);
        assert_eq!(read_count(&[json!({ "total": 3 })]), 0);
    }

    #[test]
    fn test_read_group_counts_merges_and_skips() {
        let rows = vec![
            json!({ "key": "RecordedUser:a", "count": 2 }),
            json!({ "key": "RecordedUser:b", "count": 1 }),
            json!({ "key": null, "count": 9 }),
            json!({ "key": "RecordedUser:a", "count": 1 }),
        ];
        let counts = read_group_counts(&rows);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["RecordedUser:a"], 3);
        assert_eq!(counts["RecordedUser:b"], 1);
    }
}
