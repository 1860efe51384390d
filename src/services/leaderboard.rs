use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::recorder::LeaderboardEntry;

pub const MAX_LEADERBOARD_ENTRIES: usize = 100;
const RECENT_GAMES: usize = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Leaderboard file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Leaderboard encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("Unknown time filter: {}", other)),
        }
    }
}

impl TimeFilter {
    pub fn includes(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Today => timestamp.date_naive() == now.date_naive(),
            Self::Week => timestamp >= now - Duration::days(7),
            Self::Month => timestamp >= now - Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_players: usize,
    pub average_score: u32,
    pub highest_score: u32,
    pub highest_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub username: String,
    pub total_games: usize,
    pub total_score: u64,
    pub average_score: f64,
    pub best_score: u32,
    pub most_played_word: String,
    pub recent_games: Vec<LeaderboardEntry>,
}

/// Where finished rounds go.
pub trait LeaderboardStore: Send + Sync {
    fn record(&self, entry: LeaderboardEntry) -> Result<(), StoreError>;

    /// Entries passing `filter`, best first.
    fn list(&self, filter: TimeFilter, now: DateTime<Utc>, limit: usize) -> Vec<LeaderboardEntry>;

    fn rank(&self, score: u32, level: u32) -> usize;

    fn stats(&self) -> LeaderboardStats;

    fn player_stats(&self, username: &str) -> Option<PlayerStats>;
}

/// Leaderboard held in memory, optionally mirrored to a JSON file.
pub struct MemoryLeaderboard {
    entries: Mutex<Vec<LeaderboardEntry>>,
    snapshot: Option<PathBuf>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()), snapshot: None }
    }

    /// Mirror to `path`, seeding from it when it already holds entries.
    pub fn with_snapshot(path: PathBuf) -> Self {
        let mut entries: Vec<LeaderboardEntry> = match fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
                warn!("Ignoring unreadable leaderboard file {}: {}", path.display(), e);
                Vec::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Could not read leaderboard file {}: {}", path.display(), e);
                Vec::new()
            }
        };
        sort_entries(&mut entries);
        entries.truncate(MAX_LEADERBOARD_ENTRIES);
        info!("Loaded {} leaderboard entries from {}.", entries.len(), path.display());

        Self { entries: Mutex::new(entries), snapshot: Some(path) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LeaderboardEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn save(&self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        if let Some(path) = &self.snapshot {
            let body = serde_json::to_string_pretty(entries)?;
            fs::write(path, body)?;
        }
        Ok(())
    }
}

impl Default for MemoryLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Score descending, level descending as the tiebreak.
fn sort_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then(b.level.cmp(&a.level)));
}

impl LeaderboardStore for MemoryLeaderboard {
    fn record(&self, entry: LeaderboardEntry) -> Result<(), StoreError> {
        let mut entries = self.lock();
        entries.push(entry);
        sort_entries(&mut entries);
        entries.truncate(MAX_LEADERBOARD_ENTRIES);
        self.save(&entries)
    }

    fn list(&self, filter: TimeFilter, now: DateTime<Utc>, limit: usize) -> Vec<LeaderboardEntry> {
        self.lock()
            .iter()
            .filter(|e| filter.includes(e.timestamp, now))
            .take(limit)
            .cloned()
            .collect()
    }

    fn rank(&self, score: u32, level: u32) -> usize {
        let entries = self.lock();
        entries
            .iter()
            .position(|e| e.score == score && e.level == level)
            .map(|i| i + 1)
            .unwrap_or(entries.len() + 1)
    }

    fn stats(&self) -> LeaderboardStats {
        let entries = self.lock();
        if entries.is_empty() {
            return LeaderboardStats {
                total_players: 0,
                average_score: 0,
                highest_score: 0,
                highest_level: 0,
            };
        }

        let total: u64 = entries.iter().map(|e| e.score as u64).sum();
        LeaderboardStats {
            total_players: entries.len(),
            average_score: (total as f64 / entries.len() as f64).round() as u32,
            highest_score: entries.iter().map(|e| e.score).max().unwrap_or(0),
            highest_level: entries.iter().map(|e| e.level).max().unwrap_or(0),
        }
    }

    fn player_stats(&self, username: &str) -> Option<PlayerStats> {
        let entries = self.lock();
        let games: Vec<&LeaderboardEntry> =
            entries.iter().filter(|e| e.username == username).collect();
        if games.is_empty() {
            return None;
        }

        let total_score: u64 = games.iter().map(|e| e.score as u64).sum();
        let average = total_score as f64 / games.len() as f64;

        let mut plays: HashMap<&str, usize> = HashMap::new();
        for game in &games {
            *plays.entry(game.target_word.as_str()).or_insert(0) += 1;
        }
        // Ties go to the word that appears first on the board.
        let most_played = games
            .iter()
            .map(|g| g.target_word.as_str())
            .fold(None::<(&str, usize)>, |best, word| {
                let count = plays[word];
                match best {
                    Some((_, n)) if n >= count => best,
                    _ => Some((word, count)),
                }
            })
            .map(|(word, _)| word.to_string())
            .unwrap_or_else(|| "None".to_string());

        Some(PlayerStats {
            username: username.to_string(),
            total_games: games.len(),
            total_score,
            average_score: (average * 100.0).round() / 100.0,
            best_score: games.iter().map(|e| e.score).max().unwrap_or(0),
            most_played_word: most_played,
            recent_games: games.iter().take(RECENT_GAMES).map(|e| (*e).clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn entry(username: &str, score: u32, level: u32, word: &str, days_ago: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            username: username.to_string(),
            score,
            level,
            target_word: word.to_string(),
            timestamp: now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_record_keeps_score_then_level_order() {
        let board = MemoryLeaderboard::new();
        board.record(entry("a", 5, 1, "Cat", 0)).unwrap();
        board.record(entry("b", 9, 2, "Dog", 0)).unwrap();
        board.record(entry("c", 5, 3, "Sun", 0)).unwrap();

        let names: Vec<String> = board
            .list(TimeFilter::All, now(), 50)
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_record_truncates_to_capacity() {
        let board = MemoryLeaderboard::new();
        for score in 0..(MAX_LEADERBOARD_ENTRIES as u32 + 5) {
            board.record(entry("p", score, 1, "Cat", 0)).unwrap();
        }
        let all = board.list(TimeFilter::All, now(), usize::MAX);
        assert_eq!(all.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(all[0].score, MAX_LEADERBOARD_ENTRIES as u32 + 4);
        assert_eq!(all.last().unwrap().score, 5);
    }

    #[test]
    fn test_time_filters() {
        let board = MemoryLeaderboard::new();
        board.record(entry("today", 1, 1, "Cat", 0)).unwrap();
        board.record(entry("lastweek", 2, 1, "Cat", 5)).unwrap();
        board.record(entry("lastmonth", 3, 1, "Cat", 20)).unwrap();
        board.record(entry("ancient", 4, 1, "Cat", 90)).unwrap();

        assert_eq!(board.list(TimeFilter::All, now(), 50).len(), 4);
        assert_eq!(board.list(TimeFilter::Month, now(), 50).len(), 3);
        assert_eq!(board.list(TimeFilter::Week, now(), 50).len(), 2);
        let today = board.list(TimeFilter::Today, now(), 50);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].username, "today");
        assert_eq!(board.list(TimeFilter::All, now(), 2).len(), 2);
    }

    #[test]
    fn test_time_filter_parsing() {
        assert_eq!("Week".parse::<TimeFilter>(), Ok(TimeFilter::Week));
        assert_eq!("all".parse::<TimeFilter>(), Ok(TimeFilter::All));
        assert!("decade".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn test_rank() {
        let board = MemoryLeaderboard::new();
        board.record(entry("a", 10, 2, "Cat", 0)).unwrap();
        board.record(entry("b", 7, 1, "Dog", 0)).unwrap();
        assert_eq!(board.rank(10, 2), 1);
        assert_eq!(board.rank(7, 1), 2);
        assert_eq!(board.rank(8, 1), 3);
        assert_eq!(MemoryLeaderboard::new().rank(1, 1), 1);
    }

    #[test]
    fn test_stats() {
        let board = MemoryLeaderboard::new();
        assert_eq!(board.stats().total_players, 0);
        board.record(entry("a", 4, 1, "Cat", 0)).unwrap();
        board.record(entry("b", 7, 3, "Dog", 0)).unwrap();
        let stats = board.stats();
        assert_eq!(stats.total_players, 2);
        assert_eq!(stats.average_score, 6);
        assert_eq!(stats.highest_score, 7);
        assert_eq!(stats.highest_level, 3);
    }

    #[test]
    fn test_player_stats() {
        let board = MemoryLeaderboard::new();
        board.record(entry("ann", 3, 1, "Cat", 0)).unwrap();
        board.record(entry("ann", 6, 2, "Dog", 0)).unwrap();
        board.record(entry("ann", 2, 1, "Dog", 0)).unwrap();
        board.record(entry("bob", 9, 2, "Sun", 0)).unwrap();

        let stats = board.player_stats("ann").unwrap();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_score, 11);
        assert_eq!(stats.average_score, 3.67);
        assert_eq!(stats.best_score, 6);
        assert_eq!(stats.most_played_word, "Dog");
        assert_eq!(stats.recent_games.len(), 3);
        assert!(board.player_stats("carol").is_none());
    }

    #[test]
    fn test_snapshot_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");

        let board = MemoryLeaderboard::with_snapshot(path.clone());
        board.record(entry("a", 4, 1, "Cat", 0)).unwrap();
        board.record(entry("b", 8, 2, "Dog", 0)).unwrap();

        let reloaded = MemoryLeaderboard::with_snapshot(path);
        let names: Vec<String> = reloaded
            .list(TimeFilter::All, now(), 50)
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_unreadable_snapshot_starts_empty() {
        // A directory can't be read as a file, which is not a NotFound error.
        let dir = tempfile::tempdir().unwrap();
        let board = MemoryLeaderboard::with_snapshot(dir.path().to_path_buf());
        assert!(board.list(TimeFilter::All, now(), 10).is_empty());

        let missing = MemoryLeaderboard::with_snapshot(dir.path().join("absent.json"));
        assert_eq!(missing.stats().total_players, 0);
    }

    #[test]
    fn test_snapshot_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("leaderboard.json");
        let board = MemoryLeaderboard::with_snapshot(path);
        let err = board.record(entry("a", 1, 1, "Cat", 0)).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        // The entry is still kept in memory.
        assert_eq!(board.rank(1, 1), 1);
    }
}
