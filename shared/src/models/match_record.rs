use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use crate::error::{Result, SharedError};
use super::lenient::lenient_u64;

/// Outcome of a match from one participant's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

/// A recorded match. Matches are created by the game server; this backend only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub id: String,

    pub created_at: DateTime<Utc>,

    /// Player record ids taking part in the match
    #[serde(default)]
    pub participants: Vec<String>,

    /// Free-form opponent label shown in match history
    #[serde(default)]
    pub opponent: Option<String>,

    /// Winning player id, absent for a draw
    #[serde(default)]
    pub winner: Option<String>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub points: u64,

    #[serde(default, rename = "cardsPlayed", deserialize_with = "lenient_u64")]
    pub cards_played: u64,

    #[serde(default, rename = "specialCardsPlayed", deserialize_with = "lenient_u64")]
    pub special_cards_played: u64,

    #[serde(default, rename = "cardsRemaining", deserialize_with = "lenient_u64")]
    pub cards_remaining: u64,

    #[serde(default, rename = "cardsDrawn", deserialize_with = "lenient_u64")]
    pub cards_drawn: u64,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub turns: u64,

    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default, rename = "specialCards")]
    pub special_cards: Vec<SpecialCardUsage>,

    #[serde(default, rename = "keyMoments")]
    pub key_moments: Vec<KeyMoment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialCardUsage {
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MomentImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyMoment {
    pub turn: u32,
    pub impact: MomentImpact,
    pub description: String,
}

/// A match as seen by one participant, as listed in a player's match history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerMatchView {
    #[serde(flatten)]
    pub record: MatchRecord,
    pub result: MatchResult,
}

impl MatchRecord {
    /// Converts an untyped row into a match record, rejecting rows without
    /// an id or a parseable `created_at`.
    pub fn from_row(row: &Value) -> Result<Self> {
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SharedError::MalformedRecord("match row has no id".to_string()))?;

        serde_json::from_value(row.clone())
            .map_err(|e| SharedError::MalformedRecord(format!("match {}: {}", id, e)))
    }

    /// Win if the player is the winner, draw when nobody won, loss otherwise.
    pub fn result_for(&self, player_id: &str) -> MatchResult {
        match self.winner.as_deref() {
            None => MatchResult::Draw,
            Some(winner) if winner == player_id => MatchResult::Win,
            Some(_) => MatchResult::Loss,
        }
    }

    pub fn view_for(self, player_id: &str) -> PlayerMatchView {
        let result = self.result_for(player_id);
        PlayerMatchView { record: self, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Value {
        json!({
            "id": "Match:1",
            "created_at": "2026-10-14T18:30:00Z",
            "participants": ["RecordedUser:alice", "RecordedUser:bob"],
            "opponent": "Bob",
            "winner": "RecordedUser:alice",
            "points": 10,
            "cardsPlayed": 12,
            "specialCardsPlayed": 3,
            "specialCards": [{ "name": "+4", "type": "wild4", "color": "black", "count": 1 }],
            "keyMoments": [{ "turn": 3, "impact": "positive", "description": "Played a +4" }]
        })
    }

    #[test]
    fn test_from_row() {
        let record = MatchRecord::from_row(&sample_row()).unwrap();
        assert_eq!(record.participants.len(), 2);
        assert_eq!(record.cards_played, 12);
        assert_eq!(record.special_cards[0].card_type, "wild4");
        assert_eq!(record.key_moments[0].impact, MomentImpact::Positive);
        assert_eq!(record.turns, 0);
    }

    #[test]
    fn test_from_row_requires_timestamp() {
        let row = json!({ "id": "Match:2" });
        assert!(matches!(MatchRecord::from_row(&row), Err(SharedError::MalformedRecord(_))));
    }

    #[test]
    fn test_result_for_each_participant() {
        let mut record = MatchRecord::from_row(&sample_row()).unwrap();
        assert_eq!(record.result_for("RecordedUser:alice"), MatchResult::Win);
        assert_eq!(record.result_for("RecordedUser:bob"), MatchResult::Loss);

        record.winner = None;
        assert_eq!(record.result_for("RecordedUser:bob"), MatchResult::Draw);
    }

    #[test]
    fn test_view_serializes_result_inline() {
        let view = MatchRecord::from_row(&sample_row()).unwrap().view_for("RecordedUser:bob");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["result"], "loss");
        assert_eq!(json["id"], "Match:1");
    }
}
