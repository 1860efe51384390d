use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::services::catalog::Catalog;
use crate::services::challenge::ChallengeBoard;
use crate::services::leaderboard::LeaderboardStore;
use crate::services::sessions::SessionHub;
use crate::services::word_tracker::{UsageStats, UsedWordStore};

/// Application state shared across all handlers
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub tracker: Arc<dyn UsedWordStore>,
    pub leaderboard: Arc<dyn LeaderboardStore>,
    pub hub: Arc<SessionHub>,
    pub challenges: ChallengeBoard,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Serialize)]
pub struct HintResponse {
    pub hint: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub time_filter: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct RankQuery {
    pub score: u32,
    pub level: u32,
}

#[derive(Serialize)]
pub struct RankResponse {
    pub rank: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    pub username: String,
    pub target_word: String,
    pub score: u32,
    pub level: Option<u32>,
}

#[derive(Serialize)]
pub struct SubmitResultResponse {
    pub success: bool,
    pub rank: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStatsQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStatsResponse {
    pub total_words: usize,
    pub available_for_user: usize,
    #[serde(flatten)]
    pub usage: UsageStats,
}

#[derive(Serialize)]
pub struct WordsResponse {
    pub total: usize,
    pub words: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub round_seconds: u32,
    pub word_display_millis: u64,
    pub countdown_millis: u64,
    pub tick_millis: u64,
    pub min_word_length: usize,
    pub target_words: usize,
    pub difficulties: HashMap<String, usize>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}
