use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::services::catalog::{Catalog, Difficulty};
use crate::services::selection::{available, select_next};
use crate::utils::{random_source, RandomSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub id: String,
    pub target_word: String,
    pub date: String,
    pub description: String,
    pub difficulty: Difficulty,
}

struct Board {
    by_date: BTreeMap<NaiveDate, DailyChallenge>,
    rng: Box<dyn RandomSource + Send>,
}

/// One featured keyword set per calendar day.
pub struct ChallengeBoard {
    board: Mutex<Board>,
}

impl ChallengeBoard {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_random(random_source(seed))
    }

    pub fn with_random(rng: Box<dyn RandomSource + Send>) -> Self {
        Self { board: Mutex::new(Board { by_date: BTreeMap::new(), rng }) }
    }

    pub fn challenge_for(&self, date: NaiveDate, catalog: &Catalog) -> DailyChallenge {
        let mut board = self.board.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Board { by_date, rng } = &mut *board;
        if let Some(challenge) = by_date.get(&date) {
            return challenge.clone();
        }

        let mut featured: HashSet<String> = by_date
            .values()
            .map(|c| c.target_word.to_lowercase())
            .collect();
        if available(catalog, &featured).is_empty() {
            featured.clear();
        }

        let set = select_next(catalog, &featured, &mut **rng);
        let date_str = date.format("%Y-%m-%d").to_string();
        let challenge = DailyChallenge {
            id: format!("{}-{}", date_str, set.target_word.to_lowercase()),
            target_word: set.target_word.clone(),
            date: date_str,
            description: set.description.clone(),
            difficulty: set.difficulty,
        };

        info!("Daily challenge for {} is {}", challenge.date, challenge.target_word);
        by_date.insert(date, challenge.clone());
        challenge
    }
}
