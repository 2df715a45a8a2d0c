pub mod models {
    mod lenient;
    pub mod player;
    pub mod match_record;
    pub mod user;
    pub mod statistics;
}

pub mod dto {
    pub mod common;
    pub mod player;
    pub mod user;
    pub mod query;
    pub mod settings;
    pub mod statistics;
}

pub mod datasource {
    pub mod gateway;
    pub mod query;
    pub mod settings;

    pub use gateway::{with_connection, Connector, DataSource, SourceFuture};
    pub use query::{record_id, split_record_id, Filter, Operand, Projection, Query, SortOrder, TimeWindow};
    pub use settings::{CollectionNames, ConnectionSettings, REDACTED_PASSWORD};
}

pub mod error;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::{
    player::{PlayerRecord, PlayerStatsBlock, CardStat, Achievement},
    match_record::{MatchRecord, MatchResult, PlayerMatchView, KeyMoment, MomentImpact, SpecialCardUsage},
    user::{UserRecord, UserRole},
    statistics::{
        AggregateSnapshot, ChartSeries, ChartDataset, LeaderboardEntry, RankChange,
        PlayerStats, DatabaseStats,
    },
};

// Re-export DTOs
pub use dto::{
    common::{PageQuery, Page, ErrorResponse, DeleteResponse},
    player::{CreatePlayerRequest, UpdatePlayerRequest, UpdatePlayerStatsRequest, AddAchievementRequest},
    user::{CreateUserRequest, UpdateUserRequest},
    query::{QueryRequest, QueryResponse, QueryHistoryItem},
    settings::ConnectionTestResponse,
    statistics::{Degraded, ActivePlayersResponse},
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_player_view_through_reexports() {
        let player = PlayerRecord::from_row(&json!({
            "id": "RecordedUser:alice",
            "name": "Alice",
            "team": "Red",
            "stats": { "games": 3, "wins": 2, "losses": 1 }
        }))
        .unwrap();

        assert_eq!(player.team.as_deref(), Some("Red"));
        assert!(!player.stats.has_outcome_drift());
    }

    #[test]
    fn test_default_collections() {
        let names = datasource::CollectionNames::default();
        assert_eq!(names.players, "RecordedUser");
        assert_eq!(names.matches, "Match");
        assert_eq!(names.users, "user");
    }
}
