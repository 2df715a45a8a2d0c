use serde::{Deserialize, Serialize};
use validator::Validate;
use lazy_static::lazy_static;
use regex::Regex;
use crate::models::player::{CardStat, PlayerStatsBlock};

lazy_static! {
    pub(crate) static ref HANDLE_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Request to register a player row
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlayerRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50), regex = "HANDLE_REGEX")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub level: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub bio: Option<String>,

    /// Initial counters; zeroed when omitted
    #[serde(default)]
    pub stats: PlayerStatsBlock,
}

/// Partial update of the player profile; omitted fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlayerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50), regex = "HANDLE_REGEX")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub level: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

/// Counters merged into the player's stats block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdatePlayerStatsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draws: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(default, rename = "cardsPlayed", skip_serializing_if = "Option::is_none")]
    pub cards_played: Option<u64>,
    #[serde(default, rename = "specialCardsPlayed", skip_serializing_if = "Option::is_none")]
    pub special_cards_played: Option<u64>,
    #[serde(default, rename = "cardStats", skip_serializing_if = "Option::is_none")]
    pub card_stats: Option<Vec<CardStat>>,
}

impl UpdatePlayerStatsRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddAchievementRequest {
    #[validate(length(min = 1, max = 100, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    /// Date the achievement was earned; today when omitted
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,
}
