use serde_json::Value;
use shared::datasource::{CollectionNames, DataSource, Query, SortOrder};
use shared::{MatchRecord, PageQuery, PlayerRecord, Result};

const NAME: &str = "name";
const CREATED_AT: &str = "created_at";
const PARTICIPANTS: &str = "participants";

pub struct PlayersRepository<'a> {
    db: &'a dyn DataSource,
    collections: &'a CollectionNames,
}

impl<'a> PlayersRepository<'a> {
    pub fn new(db: &'a dyn DataSource, collections: &'a CollectionNames) -> Self {
        Self { db, collections }
    }

    pub async fn count(&self) -> Result<u64> {
        self.db.count(&self.collections.players).await
    }

    /// One page of players ordered by name, descending
    pub async fn page(&self, page: &PageQuery) -> Result<Vec<PlayerRecord>> {
        let query = Query::builder(&self.collections.players)
            .order_by(NAME, SortOrder::Desc)
            .limit(page.limit() as usize)
            .start(page.offset())
            .build();
        let rows = self.db.query(&query).await?;
        rows.iter().map(PlayerRecord::from_row).collect()
    }

    pub async fn find(&self, id: &str) -> Result<Option<PlayerRecord>> {
        self.db.select(id).await?.as_ref().map(PlayerRecord::from_row).transpose()
    }

    pub async fn create(&self, record: Value) -> Result<PlayerRecord> {
        let row = self.db.create(&self.collections.players, record).await?;
        PlayerRecord::from_row(&row)
    }

    pub async fn merge(&self, id: &str, patch: Value) -> Result<PlayerRecord> {
        let row = self.db.merge(id, patch).await?;
        PlayerRecord::from_row(&row)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.db.delete(id).await
    }

    /// Matches the player took part in, newest first
    pub async fn matches_of(&self, player_id: &str) -> Result<Vec<MatchRecord>> {
        let query = Query::builder(&self.collections.matches)
            .filter_contains_record(PARTICIPANTS, player_id)
            .order_by(CREATED_AT, SortOrder::Desc)
            .build();
        let rows = self.db.query(&query).await?;
        rows.iter().map(MatchRecord::from_row).collect()
    }
}
