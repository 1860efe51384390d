use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::round::Round;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub target_word: String,
    pub typed_words: Vec<String>,
    pub score: u32,
    pub level: u32,
    pub time_remaining: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    pub level: u32,
    pub target_word: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot a round as a result record.
pub fn build_result(round: &Round, now: DateTime<Utc>) -> GameResult {
    GameResult {
        target_word: round.target_word().unwrap_or_default().to_string(),
        typed_words: round.found_keywords().to_vec(),
        score: round.score(),
        level: round.level(),
        time_remaining: round.time_remaining(),
        timestamp: now,
    }
}

pub fn to_entry(result: &GameResult, username: &str) -> LeaderboardEntry {
    LeaderboardEntry {
        username: username.to_string(),
        score: result.score,
        level: result.level,
        target_word: result.target_word.clone(),
        timestamp: result.timestamp,
    }
}
