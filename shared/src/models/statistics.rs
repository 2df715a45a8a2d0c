use serde::{Deserialize, Serialize};

/// Dashboard aggregate, recomputed on every request and never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateSnapshot {
    pub total_players: u64,
    pub active_players: u64,
    pub active_players_percentage: u64,
    /// Players created during the current week
    pub new_players: u64,
    pub total_matches: u64,
    /// Matches created during the current week
    pub matches_this_week: u64,
    pub chart_data: ChartSeries,
    pub top_players: Vec<LeaderboardEntry>,
}

/// Multi-series chart payload; every dataset is aligned with `labels`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u64>,
    /// Hex color suggested to the renderer
    pub color: String,
}

impl ChartSeries {
    pub fn dataset(&self, label: &str) -> Option<&ChartDataset> {
        self.datasets.iter().find(|d| d.label == label)
    }
}

/// Movement in rank since the previous period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankChange {
    /// No period-over-period history is stored yet
    #[default]
    Unknown,
    Delta(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub team: Option<String>,
    pub score: i64,
    pub change: RankChange,
}

/// Per-player summary derived from the match collection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub games: u64,
    pub wins: u64,
    /// `games - wins`: draws are counted as losses because match rows carry no draw flag per player
    pub losses: u64,
    pub active: bool,
}

/// Overview of the connected database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseStats {
    pub tables: u64,
    pub records: u64,
    pub users: u64,
    pub players: u64,
    pub active_players: u64,
    pub version: String,
}

impl Default for DatabaseStats {
    fn default() -> Self {
        Self {
            tables: 0,
            records: 0,
            users: 0,
            players: 0,
            active_players: 0,
            version: "Unknown".to_string(),
        }
    }
}
