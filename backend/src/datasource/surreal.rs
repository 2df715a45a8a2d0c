//! SurrealDB gateway over the HTTP API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::datasource::query::read_count;
use shared::datasource::{Connector, ConnectionSettings, DataSource, Query};
use shared::{Result, SharedError};
use std::time::{Duration, Instant};

use super::surrealql::{self, Statement};
use crate::metrics;

/// Opens authenticated [`SurrealClient`] handles
#[derive(Clone)]
pub struct SurrealConnector {
    client: Client,
}

impl SurrealConnector {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SharedError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[derive(Debug, Deserialize)]
struct SigninResponse {
    token: Option<String>,
}

/// One entry of the `/sql` response array
#[derive(Debug, Deserialize)]
struct StatementResult {
    status: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    detail: Option<String>,
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> SharedError {
    SharedError::DataSourceUnavailable(format!("{}: {}", context, err))
}

/// Metric status label for a gateway call
fn outcome_status<T>(outcome: &Result<T>) -> &'static str {
    match outcome {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    }
}

fn base_url(url: &str) -> String {
    url.trim_end_matches('/')
        .replacen("ws://", "http://", 1)
        .replacen("wss://", "https://", 1)
        .trim_end_matches("/rpc")
        .to_string()
}

#[async_trait]
impl Connector for SurrealConnector {
    type Source = SurrealClient;

    async fn open(&self, settings: &ConnectionSettings) -> Result<SurrealClient> {
        if !settings.is_configured() {
            return Err(SharedError::DataSourceUnavailable(
                "SurrealDB connection settings not configured".to_string(),
            ));
        }

        let base = base_url(&settings.url);
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/signin", base))
            .header("Accept", "application/json")
            .json(&json!({ "user": settings.username, "pass": settings.password }))
            .send()
            .await
            .map_err(|e| unavailable("Failed to connect to SurrealDB", e))?;

        let status = response.status();
        metrics::record_data_source_query("signin", if status.is_success() { "ok" } else { "error" }, started.elapsed());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("SurrealDB signin rejected ({}): {}", status, body);
            return Err(SharedError::DataSourceUnavailable(format!(
                "Authentication failed for user {} ({})",
                settings.username, status
            )));
        }

        let signin: SigninResponse = response
            .json()
            .await
            .map_err(|e| unavailable("Invalid signin response", e))?;
        let token = signin
            .token
            .ok_or_else(|| SharedError::DataSourceUnavailable("Signin response carried no token".to_string()))?;

        log::debug!("Opened SurrealDB handle on {} ns={} db={}", base, settings.namespace, settings.database);
        metrics::track_connection(true);

        Ok(SurrealClient {
            client: self.client.clone(),
            base,
            namespace: settings.namespace.clone(),
            database: settings.database.clone(),
            token,
        })
    }
}

/// An authenticated handle scoped to one namespace and database
pub struct SurrealClient {
    client: Client,
    base: String,
    namespace: String,
    database: String,
    token: String,
}

impl SurrealClient {
    /// Posts raw SurrealQL and returns every statement's result.
    /// The first statement that failed is reported as a query error.
    async fn post_sql(&self, operation: &str, sql: String) -> Result<Vec<Value>> {
        let started = Instant::now();
        let outcome = self.send_sql(sql).await;
        metrics::record_data_source_query(operation, outcome_status(&outcome), started.elapsed());
        outcome
    }

    async fn fetch_version(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/version", self.base))
            .send()
            .await
            .map_err(|e| unavailable("SurrealDB request failed", e))?;

        if !response.status().is_success() {
            return Err(SharedError::DataSourceUnavailable(format!(
                "SurrealDB version endpoint returned {}",
                response.status()
            )));
        }
        let text = response
            .text()
            .await
            .map_err(|e| unavailable("SurrealDB request failed", e))?;
        Ok(text.trim().to_string())
    }

    async fn send_sql(&self, sql: String) -> Result<Vec<Value>> {
        log::trace!("SurrealQL: {}", sql);

        let response = self
            .client
            .post(format!("{}/sql", self.base))
            .header("Accept", "application/json")
            .header("NS", &self.namespace)
            .header("DB", &self.database)
            .bearer_auth(&self.token)
            .body(sql)
            .send()
            .await
            .map_err(|e| unavailable("SurrealDB request failed", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SharedError::DataSourceUnavailable(format!(
                "SurrealDB refused the session ({})",
                status
            )));
        }
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("SurrealDB error body: {}", body);
            return Err(SharedError::DataSourceUnavailable(format!("SurrealDB returned {}", status)));
        }
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("information")
                .or_else(|| body.get("description"))
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string();
            return Err(SharedError::Query(message));
        }

        let results: Vec<StatementResult> = response
            .json()
            .await
            .map_err(|e| SharedError::MalformedRecord(format!("Unexpected SurrealDB response: {}", e)))?;

        results
            .into_iter()
            .map(|r| {
                if r.status.eq_ignore_ascii_case("OK") {
                    Ok(r.result)
                } else {
                    let message = r
                        .detail
                        .or_else(|| r.result.as_str().map(str::to_string))
                        .unwrap_or_else(|| r.result.to_string());
                    Err(SharedError::Query(message))
                }
            })
            .collect()
    }

    async fn run(&self, operation: &str, statement: Statement) -> Result<Value> {
        let index = statement.result_index();
        let mut results = self.post_sql(operation, statement.to_sql()).await?;
        if index >= results.len() {
            return Err(SharedError::MalformedRecord(format!(
                "SurrealDB returned {} results, expected at least {}",
                results.len(),
                index + 1
            )));
        }
        Ok(results.swap_remove(index))
    }

    async fn run_rows(&self, operation: &str, statement: Statement) -> Result<Vec<Value>> {
        match self.run(operation, statement).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn run_one(&self, operation: &str, statement: Statement) -> Result<Option<Value>> {
        Ok(self.run_rows(operation, statement).await?.into_iter().next())
    }
}

#[async_trait]
impl DataSource for SurrealClient {
    async fn count(&self, collection: &str) -> Result<u64> {
        let rows = self.run_rows("count", surrealql::render_count(collection)).await?;
        Ok(read_count(&rows))
    }

    async fn select(&self, id: &str) -> Result<Option<Value>> {
        self.run_one("select", surrealql::render_select(id)?).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        self.run_rows("query", surrealql::render_query(query)?).await
    }

    async fn create(&self, collection: &str, record: Value) -> Result<Value> {
        self.run_one("create", surrealql::render_create(collection, record)?)
            .await?
            .ok_or_else(|| SharedError::Query(format!("Create in {} returned no record", collection)))
    }

    async fn update(&self, id: &str, record: Value) -> Result<Value> {
        self.run_one("update", surrealql::render_update(id, record)?)
            .await?
            .ok_or_else(|| SharedError::NotFound(format!("Record {} not found", id)))
    }

    async fn merge(&self, id: &str, patch: Value) -> Result<Value> {
        self.run_one("merge", surrealql::render_merge(id, patch)?)
            .await?
            .ok_or_else(|| SharedError::NotFound(format!("Record {} not found", id)))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.run_one("delete", surrealql::render_delete(id)?).await?.is_some())
    }

    async fn tables(&self) -> Result<Vec<String>> {
        let info = self.run("info", surrealql::render_info_for_db()).await?;
        let tables = info
            .get("tables")
            .or_else(|| info.get("tb"))
            .and_then(Value::as_object)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        Ok(tables)
    }

    async fn version(&self) -> Result<String> {
        let started = Instant::now();
        let outcome = self.fetch_version().await;
        metrics::record_data_source_query("version", outcome_status(&outcome), started.elapsed());
        outcome
    }

    async fn execute(&self, statement: &str) -> Result<Value> {
        let mut results = self.post_sql("execute", statement.to_string()).await?;
        if results.len() == 1 {
            Ok(results.swap_remove(0))
        } else {
            Ok(Value::Array(results))
        }
    }

    async fn close(&self) -> Result<()> {
        // HTTP sessions hold no server-side state beyond the token
        log::trace!("Closing SurrealDB handle on {}", self.base);
        metrics::track_connection(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(base_url("http://localhost:8000/"), "http://localhost:8000");
        assert_eq!(base_url("ws://db.internal:8000/rpc"), "http://db.internal:8000");
        assert_eq!(base_url("wss://cloud.example.com/rpc"), "https://cloud.example.com");
    }

    #[test]
    fn test_statement_result_parsing() {
        let raw = r#"[
            {"time": "1ms", "status": "OK", "result": null},
            {"time": "2ms", "status": "ERR", "result": "Parse error near REMOVE"}
        ]"#;
        let results: Vec<StatementResult> = serde_json::from_str(raw).unwrap();
        assert_eq!(results[0].status, "OK");
        assert_eq!(results[1].result.as_str(), Some("Parse error near REMOVE"));
    }

    #[tokio::test]
    async fn test_open_without_settings_is_unavailable() {
        let connector = SurrealConnector::new(Duration::from_secs(1)).unwrap();
        let err = connector.open(&ConnectionSettings::default()).await.err().unwrap();
        assert!(matches!(err, SharedError::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let connector = SurrealConnector::new(Duration::from_millis(500)).unwrap();
        let settings = ConnectionSettings {
            url: "http://127.0.0.1:9".to_string(),
            namespace: "cards".to_string(),
            database: "test".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
        };
        let err = connector.open(&settings).await.err().unwrap();
        assert!(matches!(err, SharedError::DataSourceUnavailable(_)));
    }

    fn client_for(base: String) -> SurrealClient {
        SurrealClient {
            client: Client::new(),
            base,
            namespace: "cards".to_string(),
            database: "test".to_string(),
            token: "token".to_string(),
        }
    }

    #[test]
    fn test_outcome_status_labels() {
        assert_eq!(outcome_status(&Ok::<_, SharedError>(1)), "ok");
        let failed: Result<()> = Err(SharedError::DataSourceUnavailable("down".to_string()));
        assert_eq!(outcome_status(&failed), "data_source_unavailable");
    }

    #[actix_web::test]
    async fn test_failed_version_is_not_recorded_as_ok() {
        use actix_web::{web, App, HttpResponse, HttpServer};

        let installed = metrics::Metrics::init_global().unwrap();
        let server = HttpServer::new(|| {
            App::new().route("/version", web::get().to(|| async { HttpResponse::ServiceUnavailable().finish() }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let handle = server.run();
        let server_handle = handle.handle();
        actix_web::rt::spawn(handle);

        let ok = installed.data_source.queries_total.with_label_values(&["version", "ok"]);
        let failed = installed
            .data_source
            .queries_total
            .with_label_values(&["version", "data_source_unavailable"]);
        let (ok_before, failed_before) = (ok.get(), failed.get());

        let err = client_for(format!("http://{}", addr)).version().await.unwrap_err();
        assert!(matches!(err, SharedError::DataSourceUnavailable(msg) if msg.contains("503")));
        assert_eq!(ok.get(), ok_before);
        assert_eq!(failed.get(), failed_before + 1);

        server_handle.stop(false).await;
    }
}
