use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use crate::datasource::query::Query;
use crate::datasource::settings::ConnectionSettings;
use crate::error::Result;

/// Operations over named collections of an open database connection.
///
/// Rows are returned as already-decoded JSON; callers validate them into
/// typed records. Transport and authentication failures are reported as
/// [`SharedError::DataSourceUnavailable`](crate::SharedError::DataSourceUnavailable).
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Fetches one record by its full id (`table:key`)
    async fn select(&self, id: &str) -> Result<Option<Value>>;

    async fn query(&self, query: &Query) -> Result<Vec<Value>>;

    async fn create(&self, collection: &str, record: Value) -> Result<Value>;

    /// Replaces the content of a record
    async fn update(&self, id: &str, record: Value) -> Result<Value>;

    /// Merges a partial document into a record
    async fn merge(&self, id: &str, patch: Value) -> Result<Value>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn tables(&self) -> Result<Vec<String>>;

    async fn version(&self) -> Result<String>;

    /// Runs a raw statement typed into the query console
    async fn execute(&self, statement: &str) -> Result<Value>;

    async fn close(&self) -> Result<()>;
}

/// Opens data source handles from connection settings
#[async_trait]
pub trait Connector: Send + Sync {
    type Source: DataSource;

    async fn open(&self, settings: &ConnectionSettings) -> Result<Self::Source>;
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a>>;

/// Opens a handle, runs `work` against it and closes the handle on every
/// exit path. A failure to close is logged and does not mask the outcome.
pub async fn with_connection<C, T, F>(
    connector: &C,
    settings: &ConnectionSettings,
    work: F,
) -> Result<T>
where
    C: Connector + ?Sized,
    F: FnOnce(&C::Source) -> SourceFuture<'_, T>,
{
    let source = connector.open(settings).await?;
    let outcome = work(&source).await;
    if let Err(e) = source.close().await {
        log::warn!("Failed to close data source connection: {}", e);
    }
    outcome
}
