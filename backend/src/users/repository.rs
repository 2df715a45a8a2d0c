use serde_json::Value;
use shared::datasource::{CollectionNames, DataSource, Query, SortOrder};
use shared::{PageQuery, Result, UserRecord};

pub struct UsersRepository<'a> {
    db: &'a dyn DataSource,
    collections: &'a CollectionNames,
}

impl<'a> UsersRepository<'a> {
    pub fn new(db: &'a dyn DataSource, collections: &'a CollectionNames) -> Self {
        Self { db, collections }
    }

    pub async fn count(&self) -> Result<u64> {
        self.db.count(&self.collections.users).await
    }

    /// Newest accounts first
    pub async fn page(&self, page: &PageQuery) -> Result<Vec<UserRecord>> {
        let query = Query::builder(&self.collections.users)
            .order_by("created_at", SortOrder::Desc)
            .limit(page.limit() as usize)
            .start(page.offset())
            .build();
        let rows = self.db.query(&query).await?;
        rows.iter().map(UserRecord::from_row).collect()
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.db.select(id).await?.is_some())
    }

    pub async fn create(&self, record: Value) -> Result<UserRecord> {
        let row = self.db.create(&self.collections.users, record).await?;
        UserRecord::from_row(&row)
    }

    pub async fn merge(&self, id: &str, patch: Value) -> Result<UserRecord> {
        let row = self.db.merge(id, patch).await?;
        UserRecord::from_row(&row)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.db.delete(id).await
    }
}
