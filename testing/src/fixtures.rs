//! Row builders for seeding a data source in tests

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

pub fn player_row(key: &str, name: &str) -> Value {
    json!({
        "id": format!("RecordedUser:{}", key),
        "name": name,
        "created_at": "2024-01-15T10:00:00Z",
        "stats": {}
    })
}

/// Player row with a full stats block
pub fn player_with_stats(key: &str, name: &str, games: u64, wins: u64, losses: u64, draws: u64, points: u64) -> Value {
    json!({
        "id": format!("RecordedUser:{}", key),
        "name": name,
        "created_at": "2024-01-15T10:00:00Z",
        "stats": {
            "games": games,
            "wins": wins,
            "losses": losses,
            "draws": draws,
            "points": points,
            "cardsPlayed": 0,
            "specialCardsPlayed": 0,
            "cardStats": [],
            "achievements": []
        }
    })
}

/// Match between `participants` (player keys) played at `at`
pub fn match_row(key: &str, at: DateTime<Utc>, participants: &[&str], winner: Option<&str>) -> Value {
    let participants: Vec<String> = participants.iter().map(|p| format!("RecordedUser:{}", p)).collect();
    json!({
        "id": format!("Match:{}", key),
        "created_at": at.to_rfc3339(),
        "participants": participants,
        "winner": winner.map(|w| format!("RecordedUser:{}", w)),
        "points": 10,
        "cardsPlayed": 12,
        "turns": 15
    })
}

/// A fixed Wednesday, so that +/- a day stays in the same ISO week
pub fn wednesday() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-14T12:00:00Z")
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub fn weeks_before(now: DateTime<Utc>, weeks: i64) -> DateTime<Utc> {
    now - Duration::weeks(weeks)
}

pub fn user_row(key: &str, username: &str, created_at: &str) -> Value {
    json!({
        "id": format!("user:{}", key),
        "username": username,
        "name": username,
        "email": format!("{}@example.com", username),
        "role": "user",
        "active": true,
        "created_at": created_at
    })
}
