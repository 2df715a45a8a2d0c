//! Rendering of structured queries to SurrealQL.
//!
//! Every value reaches the server through a `LET` binding with a JSON
//! literal, so table names, record keys and filter values are never spliced
//! into statement text. Field names are checked to be plain identifiers.

use serde_json::Value;
use shared::datasource::{split_record_id, Filter, Operand, Projection, Query, SortOrder, TimeWindow};
use shared::{Result, SharedError};

const ISO_WEEK_FORMAT: &str = "%G-W%V";

/// A statement together with the variables it reads
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub bindings: Vec<(String, Value)>,
    pub text: String,
}

impl Statement {
    fn new() -> Self {
        Self { bindings: Vec::new(), text: String::new() }
    }

    fn bind(&mut self, name: &str, value: Value) -> String {
        self.bindings.push((name.to_string(), value));
        format!("${}", name)
    }

    fn bind_record(&mut self, prefix: &str, id: &str) -> Result<String> {
        let (table, key) = split_record_id(id)
            .ok_or_else(|| SharedError::BadRequest(format!("invalid record id: {}", id)))?;
        let tb = self.bind(&format!("{}_tb", prefix), Value::String(table.to_string()));
        let key = self.bind(&format!("{}_key", prefix), Value::String(key.to_string()));
        Ok(format!("type::thing({}, {})", tb, key))
    }

    /// Full request body: one `LET` per binding followed by the statement
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        for (name, value) in &self.bindings {
            sql.push_str(&format!("LET ${} = {};\n", name, value));
        }
        sql.push_str(&self.text);
        sql.push(';');
        sql
    }

    /// Position of the statement's own result in the server's response array
    pub fn result_index(&self) -> usize {
        self.bindings.len()
    }
}

/// Accepts `name` or `nested.name` made of ASCII letters, digits and underscores
pub fn check_field(field: &str) -> Result<&str> {
    let valid = !field.is_empty()
        && field.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(field)
    } else {
        Err(SharedError::BadRequest(format!("invalid field name: {}", field)))
    }
}

fn render_filter(statement: &mut Statement, index: usize, filter: &Filter) -> Result<String> {
    let name = format!("p{}", index);
    match filter {
        Filter::Eq { field, operand } => {
            let field = check_field(field)?;
            let rhs = render_operand(statement, &name, operand)?;
            Ok(format!("{} = {}", field, rhs))
        }
        Filter::Contains { field, operand } => {
            let field = check_field(field)?;
            let rhs = render_operand(statement, &name, operand)?;
            Ok(format!("{} CONTAINS {}", field, rhs))
        }
        Filter::Within { field, window: TimeWindow::CurrentWeek } => {
            let field = check_field(field)?;
            Ok(format!(
                "{field} != NONE AND time::format(<datetime> {field}, \"{fmt}\") = time::format(time::now(), \"{fmt}\")",
                field = field,
                fmt = ISO_WEEK_FORMAT
            ))
        }
    }
}

fn render_operand(statement: &mut Statement, name: &str, operand: &Operand) -> Result<String> {
    match operand {
        Operand::Literal(value) => Ok(statement.bind(name, value.clone())),
        Operand::Record(id) => statement.bind_record(name, id),
    }
}

/// Renders a structured query against `type::table($tb)`
pub fn render_query(query: &Query) -> Result<Statement> {
    let mut statement = Statement::new();
    let table = statement.bind("tb", Value::String(query.collection.clone()));

    let projection = match &query.projection {
        Projection::All => "*".to_string(),
        Projection::Fields(fields) => fields
            .iter()
            .map(|f| check_field(f))
            .collect::<Result<Vec<_>>>()?
            .join(", "),
        Projection::Count => "count() AS count".to_string(),
        Projection::CountBy(field) => format!("{} AS key, count() AS count", check_field(field)?),
    };

    let mut text = format!("SELECT {} FROM type::table({})", projection, table);

    let conditions = query
        .filters
        .iter()
        .enumerate()
        .map(|(i, f)| render_filter(&mut statement, i, f))
        .collect::<Result<Vec<_>>>()?;
    if !conditions.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&conditions.join(" AND "));
    }

    match &query.projection {
        Projection::Count => text.push_str(" GROUP ALL"),
        // SPLIT runs on projected rows, so it must name the alias
        Projection::CountBy(_) => text.push_str(" SPLIT key GROUP BY key"),
        Projection::All | Projection::Fields(_) => {
            if let Some((field, order)) = &query.order_by {
                let direction = match order {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                };
                text.push_str(&format!(" ORDER BY {} {}", check_field(field)?, direction));
            }
            if let Some(limit) = query.limit {
                text.push_str(&format!(" LIMIT {}", limit));
            }
            if let Some(start) = query.start {
                text.push_str(&format!(" START {}", start));
            }
        }
    }

    statement.text = text;
    Ok(statement)
}

pub fn render_count(collection: &str) -> Statement {
    let mut statement = Statement::new();
    let table = statement.bind("tb", Value::String(collection.to_string()));
    statement.text = format!("SELECT count() AS count FROM type::table({}) GROUP ALL", table);
    statement
}

pub fn render_select(id: &str) -> Result<Statement> {
    let mut statement = Statement::new();
    let thing = statement.bind_record("rec", id)?;
    statement.text = format!("SELECT * FROM {}", thing);
    Ok(statement)
}

/// `CREATE` into the collection; a record carrying an `id` keeps its key
pub fn render_create(collection: &str, mut record: Value) -> Result<Statement> {
    let mut statement = Statement::new();
    let id = record
        .as_object_mut()
        .ok_or_else(|| SharedError::BadRequest("record content must be an object".to_string()))?
        .remove("id");

    let target = match id {
        Some(Value::String(id)) => {
            let full = if id.contains(':') { id } else { format!("{}:{}", collection, id) };
            statement.bind_record("rec", &full)?
        }
        Some(other) => {
            return Err(SharedError::BadRequest(format!("record id must be a string, got {}", other)))
        }
        None => {
            let table = statement.bind("tb", Value::String(collection.to_string()));
            format!("type::table({})", table)
        }
    };
    let data = statement.bind("data", record);
    statement.text = format!("CREATE {} CONTENT {}", target, data);
    Ok(statement)
}

/// Replaces the content of a record; an `id` inside the content is ignored
pub fn render_update(id: &str, mut record: Value) -> Result<Statement> {
    if let Some(object) = record.as_object_mut() {
        object.remove("id");
    }
    let mut statement = Statement::new();
    let thing = statement.bind_record("rec", id)?;
    let data = statement.bind("data", record);
    statement.text = format!("UPDATE {} CONTENT {}", thing, data);
    Ok(statement)
}

pub fn render_merge(id: &str, patch: Value) -> Result<Statement> {
    let mut statement = Statement::new();
    let thing = statement.bind_record("rec", id)?;
    let data = statement.bind("data", patch);
    statement.text = format!("UPDATE {} MERGE {}", thing, data);
    Ok(statement)
}

pub fn render_delete(id: &str) -> Result<Statement> {
    let mut statement = Statement::new();
    let thing = statement.bind_record("rec", id)?;
    statement.text = format!("DELETE {} RETURN BEFORE", thing);
    Ok(statement)
}

pub fn render_info_for_db() -> Statement {
    Statement { bindings: Vec::new(), text: "INFO FOR DB".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_weekly_participation_query() {
        let query = Query::builder("Match")
            .within_current_week("created_at")
            .count_by("participants")
            .build();
        let statement = render_query(&query).unwrap();

        assert_eq!(
            statement.text,
            "SELECT participants AS key, count() AS count FROM type::table($tb) \
             WHERE created_at != NONE AND time::format(<datetime> created_at, \"%G-W%V\") = time::format(time::now(), \"%G-W%V\") \
             SPLIT key GROUP BY key"
        );
        assert_eq!(statement.bindings, vec![("tb".to_string(), json!("Match"))]);
        assert_eq!(statement.result_index(), 1);
    }

    #[test]
    fn test_count_by_splits_the_output_alias() {
        let query = Query::builder("Match").count_by("participants").build();
        let text = render_query(&query).unwrap().text;
        assert!(text.starts_with("SELECT participants AS key, count() AS count"));
        assert!(text.ends_with(" SPLIT key GROUP BY key"));
        assert!(!text.contains("SPLIT participants"));
    }

    #[test]
    fn test_record_operands_are_bound() {
        let query = Query::builder("Match")
            .filter_contains_record("participants", "RecordedUser:alice")
            .filter_eq_record("winner", "RecordedUser:alice")
            .count()
            .build();
        let statement = render_query(&query).unwrap();

        assert_eq!(
            statement.text,
            "SELECT count() AS count FROM type::table($tb) \
             WHERE participants CONTAINS type::thing($p0_tb, $p0_key) AND winner = type::thing($p1_tb, $p1_key) GROUP ALL"
        );
        assert_eq!(statement.bindings.len(), 5);
        assert_eq!(statement.bindings[2], ("p0_key".to_string(), json!("alice")));
    }

    #[test]
    fn test_paged_listing() {
        let query = Query::builder("RecordedUser")
            .order_by("name", SortOrder::Desc)
            .limit(10)
            .start(20)
            .build();
        let statement = render_query(&query).unwrap();
        assert_eq!(
            statement.text,
            "SELECT * FROM type::table($tb) ORDER BY name DESC LIMIT 10 START 20"
        );
    }

    #[test]
    fn test_literal_values_use_let_bindings() {
        let query = Query::builder("user").filter_eq("role", "admin").fields(&["id", "email"]).build();
        let statement = render_query(&query).unwrap();
        assert_eq!(
            statement.to_sql(),
            "LET $tb = \"user\";\nLET $p0 = \"admin\";\nSELECT id, email FROM type::table($tb) WHERE role = $p0;"
        );
    }

    #[test]
    fn test_injection_through_field_names_is_rejected() {
        let query = Query::builder("user").order_by("name; REMOVE TABLE user", SortOrder::Asc).build();
        assert!(matches!(render_query(&query), Err(SharedError::BadRequest(_))));

    }

    #[rstest]
    #[case("stats.wins", true)]
    #[case("created_at", true)]
    #[case("9lives", false)]
    #[case("", false)]
    #[case("name DESC", false)]
    #[case("a..b", false)]
    fn test_check_field(#[case] field: &str, #[case] accepted: bool) {
        assert_eq!(check_field(field).is_ok(), accepted);
    }

    #[test]
    fn test_create_keeps_explicit_key() {
        let statement = render_create("RecordedUser", json!({ "id": "alice", "name": "Alice" })).unwrap();
        assert_eq!(statement.text, "CREATE type::thing($rec_tb, $rec_key) CONTENT $data");
        assert_eq!(statement.bindings[0].1, json!("RecordedUser"));
        assert_eq!(statement.bindings[2].1, json!({ "name": "Alice" }));

        let statement = render_create("user", json!({ "name": "Bob" })).unwrap();
        assert_eq!(statement.text, "CREATE type::table($tb) CONTENT $data");

        assert!(render_create("user", json!([1, 2])).is_err());
    }

    #[test]
    fn test_update_strips_id_from_content() {
        let statement = render_update("user:1", json!({ "id": "user:1", "name": "Renamed" })).unwrap();
        assert_eq!(statement.text, "UPDATE type::thing($rec_tb, $rec_key) CONTENT $data");
        assert_eq!(statement.bindings[2].1, json!({ "name": "Renamed" }));
    }

    #[test]
    fn test_invalid_record_id() {
        assert!(matches!(render_delete("no-table"), Err(SharedError::BadRequest(_))));
        assert_eq!(render_delete("user:⟨x-1⟩").unwrap().bindings[1].1, json!("x-1"));
    }
}
