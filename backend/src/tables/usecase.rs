use log::{info, warn};
use serde_json::Value;
use shared::datasource::{record_id, split_record_id, Connector};
use shared::{DeleteResponse, Page, PageQuery, Result, SharedError};
use validator::Validate;

use super::repository::TablesRepository;
use crate::datasource::Gateway;

/// Full id of a record of `table`, rejecting ids that point into another table
pub fn table_record_id(table: &str, key_or_id: &str) -> Result<String> {
    let id = record_id(table, key_or_id);
    match split_record_id(&id) {
        Some((owner, key)) if owner == table && !key.is_empty() => Ok(id),
        _ => Err(SharedError::BadRequest(format!(
            "Record {} does not belong to table {}",
            key_or_id, table
        ))),
    }
}

/// Record content without its `id`; the content must be a JSON object
pub fn content_without_id(mut record: Value) -> Result<Value> {
    let fields = record
        .as_object_mut()
        .ok_or_else(|| SharedError::BadRequest("Record content must be a JSON object".to_string()))?;
    fields.remove("id");
    Ok(record)
}

pub struct TablesUseCase<'a, C: Connector> {
    gateway: &'a Gateway<C>,
}

impl<'a, C: Connector> TablesUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.gateway
            .run(|db| Box::pin(async move { TablesRepository::new(db).names().await }))
            .await
    }

    /// Table names; empty when the database cannot be reached
    pub async fn list_or_empty(&self) -> Vec<String> {
        self.list().await.unwrap_or_else(|e| {
            warn!("Failed to fetch tables: {}", e);
            Vec::new()
        })
    }

    pub async fn records(&self, table: &str, page: PageQuery) -> Result<Page<Value>> {
        page.validate()?;
        let table = table.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = TablesRepository::new(db);
                    let total = repo.count(&table).await?;
                    let items = repo.page(&table, &page).await?;
                    Ok(Page::new(items, total, &page))
                })
            })
            .await
    }

    pub async fn records_or_empty(&self, table: &str, page: PageQuery) -> Result<Page<Value>> {
        page.validate()?;
        match self.records(table, page).await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Failed to fetch records from table {}: {}", table, e);
                Ok(Page::empty(&page))
            }
        }
    }

    pub async fn create(&self, table: &str, record: Value) -> Result<Value> {
        if !record.is_object() {
            return Err(SharedError::BadRequest("Record content must be a JSON object".to_string()));
        }
        let table = table.to_string();
        let created = self
            .gateway
            .run(move |db| Box::pin(async move { TablesRepository::new(db).create(&table, record).await }))
            .await?;
        info!("Created record {}", created.get("id").and_then(Value::as_str).unwrap_or("?"));
        Ok(created)
    }

    /// Replaces the whole content of a record. Any `id` in the payload is dropped.
    pub async fn replace(&self, table: &str, key_or_id: &str, record: Value) -> Result<Value> {
        let id = table_record_id(table, key_or_id)?;
        let content = content_without_id(record)?;
        self.gateway
            .run(move |db| Box::pin(async move { TablesRepository::new(db).replace(&id, content).await }))
            .await
    }

    pub async fn delete(&self, table: &str, key_or_id: &str) -> Result<DeleteResponse> {
        let id = table_record_id(table, key_or_id)?;
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    if TablesRepository::new(db).delete(&id).await? {
                        info!("Deleted record {}", id);
                        Ok(DeleteResponse { success: true })
                    } else {
                        Err(SharedError::NotFound(format!("Record {} not found", id)))
                    }
                })
            })
            .await
    }
}
