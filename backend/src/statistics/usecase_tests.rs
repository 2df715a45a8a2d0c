#[cfg(test)]
mod statistics_usecase_tests {
    use crate::datasource::Gateway;
    use crate::settings::SettingsStore;
    use crate::statistics::usecase::*;
    use crate::test_helpers::{gateway, memory_settings};
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use shared::datasource::{CollectionNames, DataSource, Query};
    use shared::{RankChange, Result, SharedError};
    use testing::fixtures::{match_row, player_row, player_with_stats, wednesday, weeks_before};
    use testing::{InMemoryDataSource, InMemoryStore, UnreachableConnector};

    mock! {
        pub Source {}

        #[async_trait]
        impl DataSource for Source {
            async fn count(&self, collection: &str) -> Result<u64>;
            async fn select(&self, id: &str) -> Result<Option<Value>>;
            async fn query(&self, query: &Query) -> Result<Vec<Value>>;
            async fn create(&self, collection: &str, record: Value) -> Result<Value>;
            async fn update(&self, id: &str, record: Value) -> Result<Value>;
            async fn merge(&self, id: &str, patch: Value) -> Result<Value>;
            async fn delete(&self, id: &str) -> Result<bool>;
            async fn tables(&self) -> Result<Vec<String>>;
            async fn version(&self) -> Result<String>;
            async fn execute(&self, statement: &str) -> Result<Value>;
            async fn close(&self) -> Result<()>;
        }
    }

    /// alice and bob played this week, carol only weeks ago, dave never
    /// but carries an explicit score and joined this week.
    async fn seeded_store() -> InMemoryStore {
        let now = wednesday();
        let store = InMemoryStore::new();
        store.set_now(now).await;

        let mut dave = player_row("dave", "Dave");
        dave["score"] = json!(50);
        dave["created_at"] = json!(now.to_rfc3339());

        store
            .insert_rows(
                "RecordedUser",
                vec![
                    player_with_stats("alice", "Alice", 100, 40, 30, 30, 500),
                    player_row("bob", "Bob"),
                    player_row("carol", "Carol"),
                    dave,
                ],
            )
            .await;
        store
            .insert_rows(
                "Match",
                vec![
                    match_row("1", now - Duration::days(1), &["alice", "bob"], Some("alice")),
                    match_row("2", weeks_before(now, 2), &["alice", "carol"], Some("carol")),
                    match_row("3", weeks_before(now, 3), &["alice", "bob"], None),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_active_player_count() {
        let store = seeded_store().await;
        let db = InMemoryDataSource::new(store);
        let active = compute_active_player_count(&db, &CollectionNames::default()).await.unwrap();
        assert_eq!(active, 2);
    }

    #[tokio::test]
    async fn test_active_player_count_with_no_matches() {
        let store = InMemoryStore::new();
        store.insert_rows("RecordedUser", vec![player_row("solo", "Solo")]).await;
        let db = InMemoryDataSource::new(store);
        let active = compute_active_player_count(&db, &CollectionNames::default()).await.unwrap();
        assert_eq!(active, 0);
    }

    #[tokio::test]
    async fn test_dashboard_snapshot() {
        let store = seeded_store().await;
        let db = InMemoryDataSource::new(store);
        let snapshot = compute_dashboard_snapshot(&db, &CollectionNames::default()).await.unwrap();

        assert_eq!(snapshot.total_players, 4);
        assert_eq!(snapshot.active_players, 2);
        assert_eq!(snapshot.active_players_percentage, 50);
        assert_eq!(snapshot.new_players, 1);
        assert_eq!(snapshot.total_matches, 3);
        assert_eq!(snapshot.matches_this_week, 1);
        assert_eq!(snapshot.chart_data.labels.len(), 6);
        assert_eq!(
            snapshot.chart_data.dataset("Active Players").map(|d| d.data.clone()),
            Some(vec![1, 1, 2, 2, 2, 2])
        );
        assert_eq!(snapshot.top_players.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_database_has_zero_percentage() {
        let db = InMemoryDataSource::new(InMemoryStore::new());
        let snapshot = compute_dashboard_snapshot(&db, &CollectionNames::default()).await.unwrap();
        assert_eq!(snapshot.total_players, 0);
        assert_eq!(snapshot.active_players_percentage, 0);
        assert!(snapshot.top_players.is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_by_score() {
        let store = seeded_store().await;
        let db = InMemoryDataSource::new(store);
        let board = compute_leaderboard(&db, &CollectionNames::default()).await.unwrap();

        let ranking: Vec<(&str, i64, usize)> = board
            .iter()
            .map(|e| (e.name.as_str(), e.score, e.rank))
            .collect();
        assert_eq!(
            ranking,
            vec![("Dave", 50, 1), ("Alice", 3, 2), ("Bob", 2, 3), ("Carol", 1, 4)]
        );
        assert!(board.iter().all(|e| e.change == RankChange::Unknown));
    }

    #[tokio::test]
    async fn test_player_stats() {
        let store = seeded_store().await;
        let db = InMemoryDataSource::new(store);
        let names = CollectionNames::default();

        let alice = compute_player_stats(&db, &names, "RecordedUser:alice").await.unwrap();
        assert_eq!((alice.games, alice.wins, alice.losses, alice.active), (3, 1, 2, true));

        let carol = compute_player_stats(&db, &names, "RecordedUser:carol").await.unwrap();
        assert_eq!((carol.games, carol.wins, carol.losses, carol.active), (1, 1, 0, false));

        let err = compute_player_stats(&db, &names, "RecordedUser:nobody").await.unwrap_err();
        assert!(matches!(err, SharedError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_player_stats_folds_draws_into_losses() {
        let now = wednesday();
        let store = InMemoryStore::new();
        store.set_now(now).await;
        store.insert_rows("RecordedUser", vec![player_row("p", "P")]).await;
        let matches = (0..10)
            .map(|i| {
                let winner = if i < 3 { Some("p") } else if i < 6 { None } else { Some("q") };
                match_row(&i.to_string(), weeks_before(now, 4), &["p", "q"], winner)
            })
            .collect();
        store.insert_rows("Match", matches).await;

        let db = InMemoryDataSource::new(store);
        let stats = compute_player_stats(&db, &CollectionNames::default(), "RecordedUser:p").await.unwrap();
        assert_eq!(stats.games, 10);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 7);
        assert!(!stats.active);
    }

    #[tokio::test]
    async fn test_performance_history() {
        let store = seeded_store().await;
        let db = InMemoryDataSource::new(store);
        let names = CollectionNames::default();

        let chart = compute_player_performance_history(&db, &names, "RecordedUser:alice").await.unwrap();
        assert_eq!(chart.dataset("Games").and_then(|d| d.data.last().copied()), Some(100));
        assert_eq!(chart.dataset("Win Rate %").and_then(|d| d.data.last().copied()), Some(40));

        let err = compute_player_performance_history(&db, &names, "RecordedUser:ghost").await.unwrap_err();
        assert!(matches!(err, SharedError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_player_row_is_reported() {
        let store = InMemoryStore::new();
        store.insert_rows("RecordedUser", vec![json!({ "id": "RecordedUser:x", "stats": 42 })]).await;
        let db = InMemoryDataSource::new(store);

        let err = compute_leaderboard(&db, &CollectionNames::default()).await.unwrap_err();
        assert!(matches!(err, SharedError::MalformedRecord(_)));
    }

    #[tokio::test]
    async fn test_null_and_fractional_counters_fall_back_per_field() {
        let now = wednesday();
        let store = InMemoryStore::new();
        store.set_now(now).await;
        let mut patchy = player_row("b", "B");
        patchy["stats"] = json!({ "games": null, "wins": 1.0, "draws": 2.0 });
        let mut huge = player_row("c", "C");
        huge["stats"] = json!({ "games": 1, "wins": u64::MAX, "losses": 1 });
        store
            .insert_rows("RecordedUser", vec![player_with_stats("a", "A", 4, 2, 1, 1, 20), patchy, huge])
            .await;
        store.insert_rows("Match", vec![match_row("1", now, &["a", "b"], Some("a"))]).await;
        let db = InMemoryDataSource::new(store);
        let names = CollectionNames::default();

        let snapshot = compute_dashboard_snapshot(&db, &names).await.unwrap();
        assert_eq!(snapshot.total_players, 3);
        assert_eq!(snapshot.active_players, 2);

        let chart = compute_player_performance_history(&db, &names, "RecordedUser:b").await.unwrap();
        assert_eq!(chart.dataset("Games").and_then(|d| d.data.last().copied()), Some(0));
        assert_eq!(chart.dataset("Wins").and_then(|d| d.data.last().copied()), Some(1));
        assert_eq!(chart.dataset("Win Rate %").and_then(|d| d.data.last().copied()), Some(0));

        assert_eq!(compute_leaderboard(&db, &names).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_database_stats_skips_failing_tables() {
        let mut source = MockSource::new();
        source
            .expect_tables()
            .returning(|| Ok(vec!["RecordedUser".to_string(), "Match".to_string(), "audit".to_string()]));
        source.expect_count().returning(|table| match table {
            "RecordedUser" => Ok(4),
            "Match" => Ok(10),
            "user" => Ok(2),
            _ => Err(SharedError::Query(format!("table {} cannot be read", table))),
        });
        source.expect_query().returning(|_| Ok(vec![]));
        source
            .expect_version()
            .returning(|| Err(SharedError::DataSourceUnavailable("reset".to_string())));

        let stats = compute_database_stats(&source, &CollectionNames::default()).await.unwrap();
        assert_eq!(stats.tables, 3);
        assert_eq!(stats.records, 14);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.players, 4);
        assert_eq!(stats.active_players, 0);
        assert_eq!(stats.version, "Unknown");
    }

    #[tokio::test]
    async fn test_database_stats_fails_without_tables() {
        let mut source = MockSource::new();
        source
            .expect_tables()
            .returning(|| Err(SharedError::DataSourceUnavailable("refused".to_string())));

        let err = compute_database_stats(&source, &CollectionNames::default()).await.unwrap_err();
        assert!(matches!(err, SharedError::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_source_yields_zeroed_snapshot() {
        let gateway = Gateway::new(
            UnreachableConnector,
            SettingsStore::new(memory_settings()),
            CollectionNames::default(),
        );
        let usecase = StatisticsUseCase::new(&gateway);

        let degraded = usecase.dashboard_snapshot_or_default().await;
        assert!(degraded.is_degraded());
        assert_eq!(degraded.data.total_players, 0);
        assert_eq!(degraded.data.active_players_percentage, 0);
        assert_eq!(degraded.data.chart_data.labels.len(), 6);
        assert!(degraded
            .warning
            .as_deref()
            .unwrap_or_default()
            .starts_with("Data source unavailable"));

        let stats = usecase.database_stats_or_default().await;
        assert!(stats.is_degraded());
        assert_eq!(stats.data.version, "Unknown");
    }

    #[tokio::test]
    async fn test_use_case_over_gateway() {
        let store = seeded_store().await;
        let gateway = gateway(&store);
        let usecase = StatisticsUseCase::new(&gateway);

        let snapshot = usecase.dashboard_snapshot_or_default().await;
        assert!(!snapshot.is_degraded());
        assert_eq!(snapshot.data.active_players, 2);

        assert!(usecase.player_stats("RecordedUser:ghost").await.is_err());
        assert_eq!(usecase.active_player_count().await.unwrap(), 2);
    }
}
