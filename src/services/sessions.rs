use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::services::catalog::{Catalog, Difficulty, KeywordSet, Progress};
use crate::services::leaderboard::LeaderboardStore;
use crate::services::recorder::{build_result, to_entry, GameResult};
use crate::services::round::{Phase, Round, TickOutcome, WordSource, ROUND_DURATION_SECS};
use crate::services::selection::{available, select_next};
use crate::services::username::resolve_username;
use crate::services::validator::ValidationResult;
use crate::services::word_tracker::UsedWordStore;
use crate::utils::{generate_user_id, pick, random_source, RandomSource};

pub const MAX_SESSIONS: usize = 10_000;

/// Lengths of the presentation steps and of one round tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Target word on screen, then "ready".
    pub word_display: Duration,
    /// 3-2-1, then "go".
    pub countdown: Duration,
    pub tick: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            word_display: Duration::from_secs(4),
            countdown: Duration::from_secs(4),
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    pub round_secs: u32,
    pub timings: Timings,
    pub seed: Option<u64>,
    /// Starting a new session past this many evicts the stalest one.
    pub max_sessions: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            round_secs: ROUND_DURATION_SECS,
            timings: Timings::default(),
            seed: None,
            max_sessions: MAX_SESSIONS,
        }
    }
}

/// What the round clock should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    /// A level was completed; run the presentation for this epoch.
    Present(u64),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user_id: String,
    pub username: String,
    pub phase: Phase,
    pub target_word: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub time_remaining: u32,
    pub found_keywords: Vec<String>,
    pub score: u32,
    pub level: u32,
    pub progress: Progress,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    /// `None` when the round was not accepting words.
    pub validation: Option<ValidationResult>,
    pub level_complete: bool,
    pub state: SessionSnapshot,
}

struct GameSession {
    user_id: String,
    username: String,
    round: Round,
    rng: Box<dyn RandomSource + Send>,
    last_result: Option<GameResult>,
    /// Hub-wide activity stamp of the last start or submission.
    last_active: u64,
}

impl GameSession {
    fn snapshot(&self) -> SessionSnapshot {
        let set = self.round.keyword_set();
        SessionSnapshot {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            phase: self.round.phase(),
            target_word: set.map(|s| s.target_word.clone()),
            description: set.map(|s| s.description.clone()),
            difficulty: set.map(|s| s.difficulty),
            time_remaining: self.round.time_remaining(),
            found_keywords: self.round.found_keywords().to_vec(),
            score: self.round.score(),
            level: self.round.level(),
            progress: self.round.progress(),
            epoch: self.round.epoch(),
        }
    }
}

/// Issues keyword sets for one user, keeping their registry current.
struct Picker<'a> {
    catalog: &'a Catalog,
    tracker: &'a dyn UsedWordStore,
    user_id: &'a str,
    rng: &'a mut dyn RandomSource,
}

impl WordSource for Picker<'_> {
    fn next_keyword_set(&mut self) -> KeywordSet {
        let mut used = self.tracker.used_words(self.user_id);
        if available(self.catalog, &used).is_empty() {
            info!("User {} has seen every target word, resetting their registry.", self.user_id);
            self.tracker.reset(self.user_id);
            used.clear();
        }

        let set = select_next(self.catalog, &used, self.rng).clone();
        self.tracker.mark_used(self.user_id, &set.target_word);
        set
    }
}

/// Make room for one more session: finished ones go first, then the least
/// recently active.
fn evict_stale(sessions: &mut HashMap<String, GameSession>, max_sessions: usize) {
    if sessions.len() < max_sessions {
        return;
    }

    let mut candidates: Vec<(bool, u64, String)> = sessions
        .values()
        .map(|s| (s.round.phase() != Phase::Finished, s.last_active, s.user_id.clone()))
        .collect();
    candidates.sort();

    let excess = sessions.len() + 1 - max_sessions.max(1);
    for (_, _, user_id) in candidates.into_iter().take(excess) {
        debug!("Evicting session {}", user_id);
        sessions.remove(&user_id);
    }
}

/// All live game sessions, one per user id.
///
/// Every mutation happens under one lock, so a tick and a submission for the
/// same session never interleave.
pub struct SessionHub {
    catalog: Arc<Catalog>,
    tracker: Arc<dyn UsedWordStore>,
    leaderboard: Arc<dyn LeaderboardStore>,
    config: HubConfig,
    sessions: Mutex<HashMap<String, GameSession>>,
    activity: AtomicU64,
}

impl SessionHub {
    pub fn new(
        catalog: Arc<Catalog>,
        tracker: Arc<dyn UsedWordStore>,
        leaderboard: Arc<dyn LeaderboardStore>,
        config: HubConfig,
    ) -> Self {
        Self {
            catalog,
            tracker,
            leaderboard,
            config,
            sessions: Mutex::new(HashMap::new()),
            activity: AtomicU64::new(0),
        }
    }

    pub fn timings(&self) -> Timings {
        self.config.timings
    }

    pub fn round_secs(&self) -> u32 {
        self.config.round_secs
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, GameSession>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn words<'a>(
        &'a self,
        user_id: &'a str,
        rng: &'a mut (dyn RandomSource + Send),
    ) -> Picker<'a> {
        Picker {
            catalog: &self.catalog,
            tracker: self.tracker.as_ref(),
            user_id,
            rng,
        }
    }

    fn touch(&self) -> u64 {
        self.activity.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn new_rng(&self) -> Box<dyn RandomSource + Send> {
        random_source(self.config.seed)
    }

    /// Start (or restart) a session. A missing user id gets a generated one.
    pub fn start(&self, user_id: Option<&str>, username: Option<&str>) -> SessionSnapshot {
        let mut sessions = self.lock();
        let mut rng = self.new_rng();

        let user_id = match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_user_id(rng.as_mut()),
        };

        if !sessions.contains_key(&user_id) {
            evict_stale(&mut sessions, self.config.max_sessions);
        }

        let session = match sessions.entry(user_id.clone()) {
            Entry::Occupied(entry) => {
                let session = entry.into_mut();
                if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
                    session.username = resolve_username(Some(name), session.rng.as_mut());
                }
                session
            }
            Entry::Vacant(entry) => {
                let username = resolve_username(username, rng.as_mut());
                entry.insert(GameSession {
                    user_id,
                    username,
                    round: Round::new(self.config.round_secs),
                    rng,
                    last_result: None,
                    last_active: 0,
                })
            }
        };

        session.last_active = self.touch();
        let mut words = self.words(&session.user_id, session.rng.as_mut());
        session.round.start(&mut words);
        info!("Session {} ({}) started", session.user_id, session.username);
        session.snapshot()
    }

    pub fn snapshot(&self, user_id: &str) -> Option<SessionSnapshot> {
        self.lock().get(user_id).map(GameSession::snapshot)
    }

    pub fn last_result(&self, user_id: &str) -> Option<GameResult> {
        self.lock().get(user_id).and_then(|s| s.last_result.clone())
    }

    pub fn submit(&self, user_id: &str, raw: &str) -> Option<SubmitOutcome> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(user_id)?;
        session.last_active = self.touch();

        let level_before = session.round.level();
        let mut words = self.words(&session.user_id, session.rng.as_mut());
        let validation = session.round.submit_word(raw, &mut words);
        debug!("Session {} submitted {:?}: {:?}", user_id, raw, validation);

        Some(SubmitOutcome {
            validation,
            level_complete: session.round.level() > level_before,
            state: session.snapshot(),
        })
    }

    /// The client finished the presentation early. Pending presentation
    /// timers are left behind by the epoch change. The flag tells whether
    /// play actually started.
    pub fn ready(&self, user_id: &str) -> Option<(bool, SessionSnapshot)> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(user_id)?;
        let started = session.round.on_presentation_complete();
        Some((started, session.snapshot()))
    }

    /// Advance preparation to countdown if `epoch` is still current.
    pub fn begin_countdown(&self, user_id: &str, epoch: u64) -> Option<u64> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(user_id)?;
        if session.round.epoch() != epoch || !session.round.begin_countdown() {
            return None;
        }
        Some(session.round.epoch())
    }

    /// Start play if `epoch` is still current.
    pub fn complete_presentation(&self, user_id: &str, epoch: u64) -> Option<u64> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(user_id)?;
        if session.round.epoch() != epoch || !session.round.on_presentation_complete() {
            return None;
        }
        Some(session.round.epoch())
    }

    pub fn tick(&self, user_id: &str, epoch: u64) -> TickControl {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(user_id) else {
            return TickControl::Stop;
        };
        if session.round.epoch() != epoch {
            debug!("Dropping stale tick for {} (epoch {})", user_id, epoch);
            return TickControl::Stop;
        }

        let mut words = self.words(&session.user_id, session.rng.as_mut());
        match session.round.on_tick(&mut words) {
            TickOutcome::Ticked { .. } => TickControl::Continue,
            TickOutcome::LevelComplete { .. } => TickControl::Present(session.round.epoch()),
            TickOutcome::Finished => {
                self.record_finished(session);
                TickControl::Stop
            }
            TickOutcome::Ignored => TickControl::Stop,
        }
    }

    fn record_finished(&self, session: &mut GameSession) {
        let result = build_result(&session.round, Utc::now());
        info!(
            "Session {} finished on level {} with score {}",
            session.user_id, result.level, result.score
        );
        let entry = to_entry(&result, &session.username);
        if let Err(e) = self.leaderboard.record(entry) {
            warn!("Failed to save result for {} to the leaderboard: {}", session.username, e);
        }
        session.last_result = Some(result);
    }

    /// One of the keywords still to find, if any.
    pub fn hint(&self, user_id: &str) -> Option<Option<String>> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(user_id)?;
        let remaining = match session.round.keyword_set() {
            Some(set) => set.remaining_keywords(session.round.found_keywords()),
            None => Vec::new(),
        };
        Some(pick(&remaining, session.rng.as_mut()).cloned())
    }
}
