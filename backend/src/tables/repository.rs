use serde_json::Value;
use shared::datasource::{DataSource, Query};
use shared::{PageQuery, Result};

/// Untyped access to any table of the connected database
pub struct TablesRepository<'a> {
    db: &'a dyn DataSource,
}

impl<'a> TablesRepository<'a> {
    pub fn new(db: &'a dyn DataSource) -> Self {
        Self { db }
    }

    pub async fn names(&self) -> Result<Vec<String>> {
        let mut names = self.db.tables().await?;
        names.sort();
        Ok(names)
    }

    pub async fn count(&self, table: &str) -> Result<u64> {
        self.db.count(table).await
    }

    pub async fn page(&self, table: &str, page: &PageQuery) -> Result<Vec<Value>> {
        let query = Query::builder(table)
            .limit(page.limit() as usize)
            .start(page.offset())
            .build();
        self.db.query(&query).await
    }

    pub async fn create(&self, table: &str, record: Value) -> Result<Value> {
        self.db.create(table, record).await
    }

    pub async fn replace(&self, id: &str, record: Value) -> Result<Value> {
        self.db.update(id, record).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.db.delete(id).await
    }
}
