use log::debug;
use serde_json::Value;
use shared::datasource::query::{read_count, read_group_counts};
use shared::datasource::{CollectionNames, DataSource, Query};
use shared::{PlayerRecord, Result};
use std::collections::HashMap;

const CREATED_AT: &str = "created_at";
const PARTICIPANTS: &str = "participants";
const WINNER: &str = "winner";

/// Reads the counts the statistics are derived from
pub struct StatisticsRepository<'a> {
    db: &'a dyn DataSource,
    collections: &'a CollectionNames,
}

impl<'a> StatisticsRepository<'a> {
    pub fn new(db: &'a dyn DataSource, collections: &'a CollectionNames) -> Self {
        Self { db, collections }
    }

    async fn count_query(&self, query: Query) -> Result<u64> {
        let rows = self.db.query(&query).await?;
        Ok(read_count(&rows))
    }

    pub async fn count_players(&self) -> Result<u64> {
        self.db.count(&self.collections.players).await
    }

    pub async fn count_matches(&self) -> Result<u64> {
        self.db.count(&self.collections.matches).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.db.count(&self.collections.users).await
    }

    /// Players created during the current ISO week
    pub async fn count_new_players(&self) -> Result<u64> {
        self.count_query(
            Query::builder(&self.collections.players)
                .within_current_week(CREATED_AT)
                .count()
                .build(),
        )
        .await
    }

    pub async fn count_matches_this_week(&self) -> Result<u64> {
        self.count_query(
            Query::builder(&self.collections.matches)
                .within_current_week(CREATED_AT)
                .count()
                .build(),
        )
        .await
    }

    /// Matches per participant id, over all time or the current week only
    pub async fn participation(&self, this_week_only: bool) -> Result<HashMap<String, u64>> {
        let mut builder = Query::builder(&self.collections.matches);
        if this_week_only {
            builder = builder.within_current_week(CREATED_AT);
        }
        let rows = self.db.query(&builder.count_by(PARTICIPANTS).build()).await?;
        Ok(read_group_counts(&rows))
    }

    pub async fn player_ids(&self) -> Result<Vec<String>> {
        let rows = self
            .db
            .query(&Query::builder(&self.collections.players).fields(&["id"]).build())
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    /// Every player row, validated
    pub async fn players(&self) -> Result<Vec<PlayerRecord>> {
        let rows = self.db.query(&Query::builder(&self.collections.players).build()).await?;
        rows.iter().map(validated_player).collect()
    }

    pub async fn find_player(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        self.db
            .select(player_id)
            .await?
            .as_ref()
            .map(validated_player)
            .transpose()
    }

    pub async fn count_player_matches(&self, player_id: &str) -> Result<u64> {
        self.count_query(
            Query::builder(&self.collections.matches)
                .filter_contains_record(PARTICIPANTS, player_id)
                .count()
                .build(),
        )
        .await
    }

    pub async fn count_player_wins(&self, player_id: &str) -> Result<u64> {
        self.count_query(
            Query::builder(&self.collections.matches)
                .filter_eq_record(WINNER, player_id)
                .count()
                .build(),
        )
        .await
    }

    pub async fn count_player_matches_this_week(&self, player_id: &str) -> Result<u64> {
        self.count_query(
            Query::builder(&self.collections.matches)
                .filter_contains_record(PARTICIPANTS, player_id)
                .within_current_week(CREATED_AT)
                .count()
                .build(),
        )
        .await
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        self.db.tables().await
    }

    pub async fn count_table(&self, table: &str) -> Result<u64> {
        self.db.count(table).await
    }

    pub async fn version(&self) -> Result<String> {
        self.db.version().await
    }
}

fn validated_player(row: &Value) -> Result<PlayerRecord> {
    let player = PlayerRecord::from_row(row)?;
    if player.stats.has_outcome_drift() {
        debug!(
            "Player {} has more outcomes than games ({} wins, {} losses, {} draws, {} games)",
            player.id, player.stats.wins, player.stats.losses, player.stats.draws, player.stats.games
        );
    }
    Ok(player)
}
