//! Pure derivations over counts already read from the data source.
//!
//! Every rounding here is half away from zero and every ratio with a zero
//! denominator is 0.

use chrono::{DateTime, Datelike, Utc};
use shared::{
    ChartDataset, ChartSeries, LeaderboardEntry, PlayerRecord, PlayerStats, PlayerStatsBlock,
    RankChange,
};

/// Number of samples in every chart series
pub const SERIES_LENGTH: usize = 6;

pub const ACTIVE_PLAYER_MULTIPLIERS: [f64; SERIES_LENGTH] = [0.65, 0.72, 0.78, 0.85, 0.92, 1.0];
pub const MATCH_MULTIPLIERS: [f64; SERIES_LENGTH] = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
pub const PERFORMANCE_MULTIPLIERS: [f64; SERIES_LENGTH] = [0.4, 0.5, 0.65, 0.75, 0.9, 1.0];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const COLOR_BLUE: &str = "#3b82f6";
const COLOR_AMBER: &str = "#f59e0b";
const COLOR_EMERALD: &str = "#10b981";
const COLOR_RED: &str = "#ef4444";
const COLOR_VIOLET: &str = "#8b5cf6";
const COLOR_PINK: &str = "#ec4899";

/// Rounds a non-negative quantity to the nearest integer, halves away from zero
pub fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// `round(100 * part / whole)`, or 0 when `whole` is 0
pub fn percentage(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    round_count(100.0 * part as f64 / whole as f64)
}

/// Scales the current value by each multiplier.
///
/// This is a placeholder for real history: nothing is stored per period, so
/// earlier samples are fractions of today's total.
pub fn extrapolate_series(current: u64, multipliers: &[f64]) -> Vec<u64> {
    multipliers
        .iter()
        .map(|m| round_count(current as f64 * m))
        .collect()
}

/// Short names of the `count` months ending with the month of `now`
pub fn month_labels(now: DateTime<Utc>, count: usize) -> Vec<String> {
    let current = now.month0() as i64;
    (0..count)
        .map(|i| {
            let index = (current - (count - 1 - i) as i64).rem_euclid(12) as usize;
            MONTH_NAMES[index].to_string()
        })
        .collect()
}

fn dataset(label: &str, data: Vec<u64>, color: &str) -> ChartDataset {
    ChartDataset {
        label: label.to_string(),
        data,
        color: color.to_string(),
    }
}

/// Dashboard chart: active players and matches over the last six months
pub fn dashboard_chart(active_players: u64, total_matches: u64, now: DateTime<Utc>) -> ChartSeries {
    ChartSeries {
        labels: month_labels(now, SERIES_LENGTH),
        datasets: vec![
            dataset(
                "Active Players",
                extrapolate_series(active_players, &ACTIVE_PLAYER_MULTIPLIERS),
                COLOR_BLUE,
            ),
            dataset(
                "Matches",
                extrapolate_series(total_matches, &MATCH_MULTIPLIERS),
                COLOR_AMBER,
            ),
        ],
    }
}

/// Six snapshots of a player's lifetime totals plus the win rate at each one
pub fn performance_history(stats: &PlayerStatsBlock, now: DateTime<Utc>) -> ChartSeries {
    let games = extrapolate_series(stats.games, &PERFORMANCE_MULTIPLIERS);
    let wins = extrapolate_series(stats.wins, &PERFORMANCE_MULTIPLIERS);
    let losses = extrapolate_series(stats.losses, &PERFORMANCE_MULTIPLIERS);
    let draws = extrapolate_series(stats.draws, &PERFORMANCE_MULTIPLIERS);
    let points = extrapolate_series(stats.points, &PERFORMANCE_MULTIPLIERS);
    let win_rate = games
        .iter()
        .zip(&wins)
        .map(|(&g, &w)| percentage(w, g))
        .collect();

    ChartSeries {
        labels: month_labels(now, SERIES_LENGTH),
        datasets: vec![
            dataset("Games", games, COLOR_BLUE),
            dataset("Wins", wins, COLOR_EMERALD),
            dataset("Losses", losses, COLOR_RED),
            dataset("Draws", draws, COLOR_AMBER),
            dataset("Points", points, COLOR_VIOLET),
            dataset("Win Rate %", win_rate, COLOR_PINK),
        ],
    }
}

/// Explicit `score` when the row has one, otherwise the participation count
pub fn leaderboard_score(player: &PlayerRecord, participation: u64) -> i64 {
    player
        .score
        .unwrap_or_else(|| i64::try_from(participation).unwrap_or(i64::MAX))
}

/// Sorts by score descending; ties keep their input order
pub fn rank_players(scored: Vec<(PlayerRecord, i64)>) -> Vec<LeaderboardEntry> {
    let mut scored = scored;
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (player, score))| LeaderboardEntry {
            rank: index + 1,
            name: display_name(&player),
            player_id: player.id,
            team: player.team,
            score,
            change: RankChange::Unknown,
        })
        .collect()
}

fn display_name(player: &PlayerRecord) -> String {
    if !player.name.is_empty() {
        return player.name.clone();
    }
    player.username.clone().unwrap_or_default()
}

/// Draws are folded into losses: `losses = games - wins`
pub fn player_stats(games: u64, wins: u64, matches_this_week: u64) -> PlayerStats {
    PlayerStats {
        games,
        wins,
        losses: games.saturating_sub(wins),
        active: matches_this_week >= 1,
    }
}
