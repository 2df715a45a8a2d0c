use chrono::Utc;
use log::{info, warn};
use shared::datasource::{CollectionNames, Connector, DataSource};
use shared::{
    AggregateSnapshot, ChartSeries, DatabaseStats, Degraded, LeaderboardEntry, PlayerStats, Result,
    SharedError,
};

use super::engine;
use super::repository::StatisticsRepository;
use crate::datasource::Gateway;

fn player_not_found(player_id: &str) -> SharedError {
    SharedError::NotFound(format!("Player {} not found", player_id))
}

/// Players with at least one match in the current ISO week
pub async fn compute_active_player_count(
    db: &dyn DataSource,
    collections: &CollectionNames,
) -> Result<u64> {
    let repo = StatisticsRepository::new(db, collections);
    let weekly = repo.participation(true).await?;
    let players = repo.player_ids().await?;

    let active = players
        .iter()
        .filter(|id| weekly.get(id.as_str()).copied().unwrap_or(0) >= 1)
        .count() as u64;
    Ok(active)
}

pub async fn compute_leaderboard(
    db: &dyn DataSource,
    collections: &CollectionNames,
) -> Result<Vec<LeaderboardEntry>> {
    let repo = StatisticsRepository::new(db, collections);
    let players = repo.players().await?;
    let participation = repo.participation(false).await?;

    let scored = players
        .into_iter()
        .map(|player| {
            let matches = participation.get(&player.id).copied().unwrap_or(0);
            let score = engine::leaderboard_score(&player, matches);
            (player, score)
        })
        .collect();
    Ok(engine::rank_players(scored))
}

pub async fn compute_dashboard_snapshot(
    db: &dyn DataSource,
    collections: &CollectionNames,
) -> Result<AggregateSnapshot> {
    let repo = StatisticsRepository::new(db, collections);

    let total_players = repo.count_players().await?;
    let active_players = compute_active_player_count(db, collections).await?;
    let new_players = repo.count_new_players().await?;
    let total_matches = repo.count_matches().await?;
    let matches_this_week = repo.count_matches_this_week().await?;
    let top_players = compute_leaderboard(db, collections).await?;

    Ok(AggregateSnapshot {
        total_players,
        active_players,
        active_players_percentage: engine::percentage(active_players, total_players),
        new_players,
        total_matches,
        matches_this_week,
        chart_data: engine::dashboard_chart(active_players, total_matches, Utc::now()),
        top_players,
    })
}

pub async fn compute_player_performance_history(
    db: &dyn DataSource,
    collections: &CollectionNames,
    player_id: &str,
) -> Result<ChartSeries> {
    let repo = StatisticsRepository::new(db, collections);
    let player = repo
        .find_player(player_id)
        .await?
        .ok_or_else(|| player_not_found(player_id))?;
    Ok(engine::performance_history(&player.stats, Utc::now()))
}

pub async fn compute_player_stats(
    db: &dyn DataSource,
    collections: &CollectionNames,
    player_id: &str,
) -> Result<PlayerStats> {
    let repo = StatisticsRepository::new(db, collections);
    if repo.find_player(player_id).await?.is_none() {
        return Err(player_not_found(player_id));
    }

    let games = repo.count_player_matches(player_id).await?;
    let wins = repo.count_player_wins(player_id).await?;
    let this_week = repo.count_player_matches_this_week(player_id).await?;
    Ok(engine::player_stats(games, wins, this_week))
}

/// Overview of the whole database. Only listing tables is fatal; every other
/// count falls back to zero and the version to "Unknown".
pub async fn compute_database_stats(
    db: &dyn DataSource,
    collections: &CollectionNames,
) -> Result<DatabaseStats> {
    let repo = StatisticsRepository::new(db, collections);
    let tables = repo.tables().await?;

    let mut records = 0;
    for table in &tables {
        match repo.count_table(table).await {
            Ok(count) => records += count,
            Err(e) => warn!("Skipping table {} in record count: {}", table, e),
        }
    }

    let users = repo.count_users().await.unwrap_or_else(|e| {
        warn!("Failed to count users: {}", e);
        0
    });
    let players = repo.count_players().await.unwrap_or_else(|e| {
        warn!("Failed to count players: {}", e);
        0
    });
    let active_players = compute_active_player_count(db, collections)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to count active players: {}", e);
            0
        });
    let version = repo.version().await.unwrap_or_else(|e| {
        warn!("Failed to read database version: {}", e);
        DatabaseStats::default().version
    });

    Ok(DatabaseStats {
        tables: tables.len() as u64,
        records,
        users,
        players,
        active_players,
        version,
    })
}

/// Snapshot served when the data source cannot answer: zero counts over
/// the usual chart layout
pub fn zeroed_snapshot() -> AggregateSnapshot {
    AggregateSnapshot {
        chart_data: engine::dashboard_chart(0, 0, Utc::now()),
        ..AggregateSnapshot::default()
    }
}

/// Statistics over a handle opened for each call
pub struct StatisticsUseCase<'a, C: Connector> {
    gateway: &'a Gateway<C>,
}

impl<'a, C: Connector> StatisticsUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>) -> Self {
        Self { gateway }
    }

    fn collections(&self) -> CollectionNames {
        self.gateway.collections().clone()
    }

    pub async fn active_player_count(&self) -> Result<u64> {
        let collections = self.collections();
        self.gateway
            .run(move |db| Box::pin(async move { compute_active_player_count(db, &collections).await }))
            .await
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let collections = self.collections();
        self.gateway
            .run(move |db| Box::pin(async move { compute_leaderboard(db, &collections).await }))
            .await
    }

    pub async fn dashboard_snapshot(&self) -> Result<AggregateSnapshot> {
        let collections = self.collections();
        self.gateway
            .run(move |db| Box::pin(async move { compute_dashboard_snapshot(db, &collections).await }))
            .await
    }

    pub async fn player_performance_history(&self, player_id: &str) -> Result<ChartSeries> {
        let collections = self.collections();
        let player_id = player_id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    compute_player_performance_history(db, &collections, &player_id).await
                })
            })
            .await
    }

    pub async fn player_stats(&self, player_id: &str) -> Result<PlayerStats> {
        let collections = self.collections();
        let player_id = player_id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move { compute_player_stats(db, &collections, &player_id).await })
            })
            .await
    }

    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let collections = self.collections();
        self.gateway
            .run(move |db| Box::pin(async move { compute_database_stats(db, &collections).await }))
            .await
    }

    /// Never fails: any error yields [`zeroed_snapshot`] and a warning
    pub async fn dashboard_snapshot_or_default(&self) -> Degraded<AggregateSnapshot> {
        match self.dashboard_snapshot().await {
            Ok(snapshot) => {
                info!(
                    "Dashboard statistics: {} players ({} active), {} matches",
                    snapshot.total_players, snapshot.active_players, snapshot.total_matches
                );
                Degraded::complete(snapshot)
            }
            Err(e) => {
                warn!("Serving default dashboard statistics: {}", e);
                Degraded::fallback(zeroed_snapshot(), e.to_string())
            }
        }
    }

    pub async fn database_stats_or_default(&self) -> Degraded<DatabaseStats> {
        match self.database_stats().await {
            Ok(stats) => Degraded::complete(stats),
            Err(e) => {
                warn!("Serving default database statistics: {}", e);
                Degraded::fallback(DatabaseStats::default(), e.to_string())
            }
        }
    }
}
