use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordUsage {
    pub word: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub user_words_today: usize,
    pub global_words_today: usize,
    pub user_words_total: usize,
    pub global_words_total: usize,
}

/// Target words already issued to each user.
pub trait UsedWordStore: Send + Sync {
    /// Lowercase target words issued to `user_id`.
    fn used_words(&self, user_id: &str) -> HashSet<String>;

    fn mark_used(&self, user_id: &str, word: &str);

    /// Forget everything issued to `user_id`.
    fn reset(&self, user_id: &str);

    fn usage_stats(&self, user_id: &str, today: NaiveDate) -> UsageStats;
}

/// Oldest records are dropped past this many.
pub const MAX_USAGE_RECORDS: usize = 100_000;

pub struct MemoryWordTracker {
    usages: Mutex<VecDeque<WordUsage>>,
    capacity: usize,
}

impl MemoryWordTracker {
    pub fn new() -> Self {
        Self::with_capacity(MAX_USAGE_RECORDS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { usages: Mutex::new(VecDeque::new()), capacity: capacity.max(1) }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<WordUsage>> {
        self.usages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryWordTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsedWordStore for MemoryWordTracker {
    fn used_words(&self, user_id: &str) -> HashSet<String> {
        self.lock()
            .iter()
            .filter(|u| u.user_id == user_id)
            .map(|u| u.word.clone())
            .collect()
    }

    fn mark_used(&self, user_id: &str, word: &str) {
        let word = word.to_lowercase();
        let mut usages = self.lock();
        if usages.iter().any(|u| u.user_id == user_id && u.word == word) {
            return;
        }
        usages.push_back(WordUsage {
            word,
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
        });
        while usages.len() > self.capacity {
            usages.pop_front();
        }
    }

    fn reset(&self, user_id: &str) {
        self.lock().retain(|u| u.user_id != user_id);
    }

    fn usage_stats(&self, user_id: &str, today: NaiveDate) -> UsageStats {
        let usages = self.lock();
        let is_today = |u: &&WordUsage| u.timestamp.date_naive() == today;

        UsageStats {
            user_words_today: usages.iter().filter(|u| u.user_id == user_id).filter(is_today).count(),
            global_words_today: usages.iter().filter(is_today).count(),
            user_words_total: usages.iter().filter(|u| u.user_id == user_id).count(),
            global_words_total: usages.len(),
        }
    }
}
