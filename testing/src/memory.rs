//! In-memory data source used by unit and handler tests.
//!
//! Evaluates [`Query`] expressions directly over JSON rows, with an
//! adjustable clock for the current-week window and switches that simulate
//! an unreachable database or broken tables.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Map, Value};
use shared::datasource::{
    split_record_id, Connector, ConnectionSettings, DataSource, Filter, Operand, Projection, Query,
    SortOrder, TimeWindow,
};
use shared::{Result, SharedError};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug)]
struct StoreState {
    tables: BTreeMap<String, Vec<Value>>,
    now: DateTime<Utc>,
    next_key: u64,
    version: String,
    refuse_connections: bool,
    fail_queries: bool,
    broken_tables: HashSet<String>,
    scripted: HashMap<String, Value>,
    executed: Vec<String>,
}

/// Shared backing store; clones see the same rows
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                tables: BTreeMap::new(),
                now: Utc::now(),
                next_key: 1,
                version: "surrealdb-memory".to_string(),
                refuse_connections: false,
                fail_queries: false,
                broken_tables: HashSet::new(),
                scripted: HashMap::new(),
                executed: Vec::new(),
            })),
        }
    }

    /// Creates an empty table so it is listed by `tables()`
    pub async fn add_table(&self, table: &str) {
        self.state.lock().await.tables.entry(table.to_string()).or_default();
    }

    /// Inserts rows as-is. Each row must carry its own `id`.
    pub async fn insert_rows(&self, table: &str, rows: Vec<Value>) {
        self.state.lock().await.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state.lock().await.tables.get(table).cloned().unwrap_or_default()
    }

    /// Moves the clock used by current-week filters
    pub async fn set_now(&self, now: DateTime<Utc>) {
        self.state.lock().await.now = now;
    }

    pub async fn set_version(&self, version: &str) {
        self.state.lock().await.version = version.to_string();
    }

    /// Makes every `open` fail as if the database were unreachable
    pub async fn refuse_connections(&self, refuse: bool) {
        self.state.lock().await.refuse_connections = refuse;
    }

    /// Lets connections open but fails every operation on them
    pub async fn fail_queries(&self, fail: bool) {
        self.state.lock().await.fail_queries = fail;
    }

    /// Makes reads of one table fail with a query error
    pub async fn break_table(&self, table: &str) {
        self.state.lock().await.broken_tables.insert(table.to_string());
    }

    /// Fixes the result returned by `execute` for an exact statement
    pub async fn script(&self, statement: &str, result: Value) {
        self.state.lock().await.scripted.insert(statement.trim().to_string(), result);
    }

    pub async fn executed(&self) -> Vec<String> {
        self.state.lock().await.executed.clone()
    }
}

/// Opens [`InMemoryDataSource`] handles over one store and counts them
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    store: InMemoryStore,
    credentials: Option<(String, String)>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            credentials: None,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Only settings with this username and password may connect
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    type Source = InMemoryDataSource;

    async fn open(&self, settings: &ConnectionSettings) -> Result<InMemoryDataSource> {
        if self.store.state.lock().await.refuse_connections {
            return Err(SharedError::DataSourceUnavailable("connection refused".to_string()));
        }
        if let Some((username, password)) = &self.credentials {
            if &settings.username != username || &settings.password != password {
                return Err(SharedError::DataSourceUnavailable(
                    "authentication failed: invalid credentials".to_string(),
                ));
            }
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryDataSource {
            store: self.store.clone(),
            closed: self.closed.clone(),
        })
    }
}

/// Connector whose database is never reachable
#[derive(Debug, Clone, Default)]
pub struct UnreachableConnector;

#[async_trait]
impl Connector for UnreachableConnector {
    type Source = InMemoryDataSource;

    async fn open(&self, settings: &ConnectionSettings) -> Result<InMemoryDataSource> {
        Err(SharedError::DataSourceUnavailable(format!(
            "cannot reach {}",
            settings.url
        )))
    }
}

pub struct InMemoryDataSource {
    store: InMemoryStore,
    closed: Arc<AtomicUsize>,
}

impl InMemoryDataSource {
    /// A handle that is not tracked by any connector
    pub fn new(store: InMemoryStore) -> Self {
        Self { store, closed: Arc::new(AtomicUsize::new(0)) }
    }
}

fn check_available(state: &StoreState, table: &str) -> Result<()> {
    if state.fail_queries {
        return Err(SharedError::DataSourceUnavailable("connection reset".to_string()));
    }
    if state.broken_tables.contains(table) {
        return Err(SharedError::Query(format!("table {} cannot be read", table)));
    }
    Ok(())
}

fn table_of(id: &str) -> Result<&str> {
    split_record_id(id)
        .map(|(table, _)| table)
        .ok_or_else(|| SharedError::BadRequest(format!("invalid record id: {}", id)))
}

fn field<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |value, part| value.get(part))
}

fn operand_value(operand: &Operand) -> Value {
    match operand {
        Operand::Literal(value) => value.clone(),
        Operand::Record(id) => Value::String(id.clone()),
    }
}

fn in_window(row: &Value, path: &str, window: TimeWindow, now: DateTime<Utc>) -> bool {
    let Some(stamp) = field(row, path)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    else {
        return false;
    };
    match window {
        TimeWindow::CurrentWeek => stamp.with_timezone(&Utc).iso_week() == now.iso_week(),
    }
}

fn matches(row: &Value, filter: &Filter, now: DateTime<Utc>) -> bool {
    match filter {
        Filter::Eq { field: path, operand } => field(row, path) == Some(&operand_value(operand)),
        Filter::Contains { field: path, operand } => {
            let wanted = operand_value(operand);
            field(row, path)
                .and_then(Value::as_array)
                .map(|items| items.contains(&wanted))
                .unwrap_or(false)
        }
        Filter::Within { field: path, window } => in_window(row, path, *window, now),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => CmpOrdering::Equal,
        (None | Some(Value::Null), _) => CmpOrdering::Less,
        (_, None | Some(Value::Null)) => CmpOrdering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// `SELECT <path> AS key`: one `{key}` row per input row
fn project_key(rows: &[Value], path: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| json!({ "key": field(row, path).cloned().unwrap_or(Value::Null) }))
        .collect()
}

/// `SPLIT <alias>` over projected rows; non-array values pass through
fn split_on(rows: Vec<Value>, alias: &str) -> Vec<Value> {
    rows.into_iter()
        .flat_map(|row| match field(&row, alias) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let mut row = row.clone();
                    row[alias] = item.clone();
                    row
                })
                .collect::<Vec<_>>(),
            _ => vec![row],
        })
        .collect()
}

/// `GROUP BY key` with `count()`
fn group_counts(rows: &[Value]) -> Vec<Value> {
    let mut counts: BTreeMap<String, (Value, u64)> = BTreeMap::new();
    for row in rows {
        let key = row.get("key").cloned().unwrap_or(Value::Null);
        counts.entry(key.to_string()).or_insert((key, 0)).1 += 1;
    }
    counts
        .into_values()
        .map(|(key, count)| json!({ "key": key, "count": count }))
        .collect()
}

/// Count-by in the order the database evaluates it: project, split, group
pub fn count_by(rows: &[Value], path: &str) -> Vec<Value> {
    group_counts(&split_on(project_key(rows, path), "key"))
}

/// Evaluates a query over a snapshot of rows
pub fn evaluate(rows: &[Value], query: &Query, now: DateTime<Utc>) -> Vec<Value> {
    let mut selected: Vec<Value> = rows
        .iter()
        .filter(|row| query.filters.iter().all(|f| matches(row, f, now)))
        .cloned()
        .collect();

    match &query.projection {
        Projection::Count => return vec![json!({ "count": selected.len() })],
        Projection::CountBy(path) => return count_by(&selected, path),
        Projection::All | Projection::Fields(_) => {}
    }

    if let Some((path, order)) = &query.order_by {
        selected.sort_by(|a, b| {
            let ordering = compare_values(field(a, path), field(b, path));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);
    let page = selected.into_iter().skip(start).take(limit);

    match &query.projection {
        Projection::Fields(fields) => page
            .map(|row| {
                let mut projected = Map::new();
                for name in fields {
                    if let Some(value) = field(&row, name) {
                        projected.insert(name.clone(), value.clone());
                    }
                }
                Value::Object(projected)
            })
            .collect(),
        _ => page.collect(),
    }
}

/// Recursive object merge; non-object values replace the target
fn merge_into(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_into(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

fn with_id(mut record: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut record {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    record
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn count(&self, collection: &str) -> Result<u64> {
        let state = self.store.state.lock().await;
        check_available(&state, collection)?;
        Ok(state.tables.get(collection).map(|rows| rows.len() as u64).unwrap_or(0))
    }

    async fn select(&self, id: &str) -> Result<Option<Value>> {
        let table = table_of(id)?;
        let state = self.store.state.lock().await;
        check_available(&state, table)?;
        Ok(state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| field(row, "id").and_then(Value::as_str) == Some(id)))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        let state = self.store.state.lock().await;
        check_available(&state, &query.collection)?;
        let rows = state.tables.get(&query.collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(evaluate(rows, query, state.now))
    }

    async fn create(&self, collection: &str, record: Value) -> Result<Value> {
        if !record.is_object() {
            return Err(SharedError::BadRequest("record content must be an object".to_string()));
        }
        let mut state = self.store.state.lock().await;
        check_available(&state, collection)?;

        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) if id.starts_with(&format!("{}:", collection)) => id.to_string(),
            Some(key) => format!("{}:{}", collection, key),
            None => {
                let key = state.next_key;
                state.next_key += 1;
                format!("{}:{}", collection, key)
            }
        };

        let rows = state.tables.entry(collection.to_string()).or_default();
        if rows.iter().any(|row| field(row, "id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(SharedError::Query(format!("Database record `{}` already exists", id)));
        }
        let stored = with_id(record, &id);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, record: Value) -> Result<Value> {
        let table = table_of(id)?.to_string();
        let mut state = self.store.state.lock().await;
        check_available(&state, &table)?;

        let stored = with_id(record, id);
        let rows = state.tables.entry(table).or_default();
        match rows.iter_mut().find(|row| field(row, "id").and_then(Value::as_str) == Some(id)) {
            Some(existing) => *existing = stored.clone(),
            None => rows.push(stored.clone()),
        }
        Ok(stored)
    }

    async fn merge(&self, id: &str, patch: Value) -> Result<Value> {
        let table = table_of(id)?.to_string();
        let mut state = self.store.state.lock().await;
        check_available(&state, &table)?;

        let rows = state.tables.entry(table).or_default();
        match rows.iter_mut().find(|row| field(row, "id").and_then(Value::as_str) == Some(id)) {
            Some(existing) => {
                merge_into(existing, &patch);
                Ok(existing.clone())
            }
            None => {
                let stored = with_id(patch, id);
                rows.push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let table = table_of(id)?.to_string();
        let mut state = self.store.state.lock().await;
        check_available(&state, &table)?;

        let Some(rows) = state.tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| field(row, "id").and_then(Value::as_str) != Some(id));
        Ok(rows.len() < before)
    }

    async fn tables(&self) -> Result<Vec<String>> {
        let state = self.store.state.lock().await;
        check_available(&state, "")?;
        Ok(state.tables.keys().cloned().collect())
    }

    async fn version(&self) -> Result<String> {
        let state = self.store.state.lock().await;
        check_available(&state, "")?;
        Ok(state.version.clone())
    }

    async fn execute(&self, statement: &str) -> Result<Value> {
        let mut state = self.store.state.lock().await;
        check_available(&state, "")?;
        let statement = statement.trim();
        state.executed.push(statement.to_string());

        if let Some(result) = state.scripted.get(statement) {
            return Ok(result.clone());
        }

        const SELECT_ALL: &str = "SELECT * FROM ";
        let is_select_all = statement
            .get(..SELECT_ALL.len())
            .map(|head| head.eq_ignore_ascii_case(SELECT_ALL))
            .unwrap_or(false);
        if is_select_all {
            let table = statement[SELECT_ALL.len()..].trim_end_matches(';').trim();
            let rows = state.tables.get(table).cloned().unwrap_or_default();
            return Ok(Value::Array(rows));
        }

        Err(SharedError::Query(format!("Parse error: unsupported statement `{}`", statement)))
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
