use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use crate::error::{Result, SharedError};
use super::lenient::{lenient_score, lenient_stats, lenient_string, lenient_u64};

/// Represents a player in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    /// Record id (format: "{table}:{key}")
    pub id: String,

    /// Display name
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub team: Option<String>,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub level: Option<u32>,

    /// Explicit leaderboard score, when the player row carries one
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<i64>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default, deserialize_with = "lenient_stats")]
    pub stats: PlayerStatsBlock,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifetime counters stored on the player row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerStatsBlock {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub games: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub wins: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub losses: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub draws: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub points: u64,
    #[serde(default, rename = "cardsPlayed", deserialize_with = "lenient_u64")]
    pub cards_played: u64,
    #[serde(default, rename = "specialCardsPlayed", deserialize_with = "lenient_u64")]
    pub special_cards_played: u64,
    #[serde(default, rename = "cardStats")]
    pub card_stats: Vec<CardStat>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl PlayerStatsBlock {
    /// Whether the outcome counters exceed the number of games.
    /// The source never enforces this, so callers only report it.
    pub fn has_outcome_drift(&self) -> bool {
        self.wins.saturating_add(self.losses).saturating_add(self.draws) > self.games
    }
}

/// Per-card usage counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardStat {
    pub name: String,
    /// number | skip | reverse | draw2 | wild | wild4
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub played: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub wins: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl PlayerRecord {
    /// Converts an untyped row from the data source into a player record.
    ///
    /// Missing numeric fields default to zero. A row that is not an object,
    /// has no string `id`, or whose `stats` field is present but not an
    /// object is rejected as malformed.
    pub fn from_row(row: &Value) -> Result<Self> {
        let object = row
            .as_object()
            .ok_or_else(|| SharedError::MalformedRecord("player row is not an object".to_string()))?;

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SharedError::MalformedRecord("player row has no id".to_string()))?;

        match object.get("stats") {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(SharedError::MalformedRecord(format!(
                    "player {} has a non-object stats field",
                    id
                )))
            }
        }

        serde_json::from_value(row.clone())
            .map_err(|e| SharedError::MalformedRecord(format!("player {}: {}", id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_row_defaults_missing_numbers_to_zero() {
        let row = json!({
            "id": "RecordedUser:alice",
            "name": "Alice",
            "stats": { "games": 12, "wins": 5 }
        });

        let player = PlayerRecord::from_row(&row).unwrap();
        assert_eq!(player.id, "RecordedUser:alice");
        assert_eq!(player.stats.games, 12);
        assert_eq!(player.stats.wins, 5);
        assert_eq!(player.stats.losses, 0);
        assert_eq!(player.stats.points, 0);
        assert!(player.stats.achievements.is_empty());
    }

    #[test]
    fn test_from_row_without_stats() {
        let row = json!({ "id": "RecordedUser:bob", "username": "bob" });
        let player = PlayerRecord::from_row(&row).unwrap();
        assert_eq!(player.stats, PlayerStatsBlock::default());
        assert_eq!(player.name, "");
    }

    #[test]
    fn test_from_row_rejects_missing_id() {
        let row = json!({ "name": "Nobody" });
        let err = PlayerRecord::from_row(&row).unwrap_err();
        assert!(matches!(err, SharedError::MalformedRecord(_)));
    }

    #[test]
    fn test_from_row_rejects_scalar_stats() {
        let row = json!({ "id": "RecordedUser:x", "stats": 42 });
        let err = PlayerRecord::from_row(&row).unwrap_err();
        assert!(matches!(err, SharedError::MalformedRecord(msg) if msg.contains("RecordedUser:x")));
    }

    #[test]
    fn test_outcome_drift() {
        let stats = PlayerStatsBlock { games: 10, wins: 6, losses: 4, draws: 1, ..Default::default() };
        assert!(stats.has_outcome_drift());

        let stats = PlayerStatsBlock { games: 10, wins: 6, losses: 3, draws: 1, ..Default::default() };
        assert!(!stats.has_outcome_drift());
    }

    #[test]
    fn test_camel_case_card_counters() {
        let row = json!({
            "id": "RecordedUser:c",
            "stats": {
                "cardsPlayed": 40,
                "specialCardsPlayed": 7,
                "cardStats": [{ "name": "+4", "type": "wild4", "played": 3, "wins": 2 }]
            }
        });
        let player = PlayerRecord::from_row(&row).unwrap();
        assert_eq!(player.stats.cards_played, 40);
        assert_eq!(player.stats.special_cards_played, 7);
        assert_eq!(player.stats.card_stats[0].card_type, "wild4");
    }

    #[test]
    fn test_from_row_reads_null_and_fractional_counters() {
        let row = json!({
            "id": "RecordedUser:d",
            "name": null,
            "score": 7.6,
            "stats": { "games": null, "wins": 3.0, "losses": -2, "draws": "4", "points": 12.5 }
        });

        let player = PlayerRecord::from_row(&row).unwrap();
        assert_eq!(player.name, "");
        assert_eq!(player.score, Some(8));
        assert_eq!(player.stats.games, 0);
        assert_eq!(player.stats.wins, 3);
        assert_eq!(player.stats.losses, 0);
        assert_eq!(player.stats.draws, 4);
        assert_eq!(player.stats.points, 13);

        let player = PlayerRecord::from_row(&json!({ "id": "RecordedUser:e", "stats": null })).unwrap();
        assert_eq!(player.stats, PlayerStatsBlock::default());
    }

    #[test]
    fn test_outcome_drift_at_counter_limit() {
        let stats = PlayerStatsBlock { games: 1, wins: u64::MAX, losses: 1, draws: 1, ..Default::default() };
        assert!(stats.has_outcome_drift());

        let stats = PlayerStatsBlock { games: u64::MAX, wins: u64::MAX, ..Default::default() };
        assert!(!stats.has_outcome_drift());
    }
}
