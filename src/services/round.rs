//! Round and level state machine.
//!
//! A round starts in `Waiting`, moves through `Preparation` and `Countdown`
//! while the word is presented, then `Playing` with a one second tick. Finding
//! every keyword of the active set moves to the next level (back to
//! `Preparation` with a fresh word); running out of time ends the round in
//! `Finished`.
//!
//! Every transition bumps the round's epoch. Timers capture the epoch they were
//! scheduled under and are dropped once it no longer matches.

use log::{debug, info};
use serde::Serialize;

use crate::services::catalog::{KeywordSet, Progress};
use crate::services::validator::{validate, ValidationResult};

pub const ROUND_DURATION_SECS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Preparation,
    Countdown,
    Playing,
    Finished,
}

/// Supplies the keyword set for each new level. Implementations are expected
/// to record the pick in the user's registry.
pub trait WordSource {
    fn next_keyword_set(&mut self) -> KeywordSet;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed.
    Ignored,
    Ticked { time_remaining: u32 },
    LevelComplete { level: u32 },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Round {
    duration: u32,
    phase: Phase,
    active: Option<KeywordSet>,
    time_remaining: u32,
    found: Vec<String>,
    score: u32,
    level: u32,
    epoch: u64,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(ROUND_DURATION_SECS)
    }
}

impl Round {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            phase: Phase::Waiting,
            active: None,
            time_remaining: duration,
            found: Vec::new(),
            score: 0,
            level: 1,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target_word(&self) -> Option<&str> {
        self.active.as_ref().map(|set| set.target_word.as_str())
    }

    pub fn keyword_set(&self) -> Option<&KeywordSet> {
        self.active.as_ref()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Keywords found on the current level, in the order they were typed.
    pub fn found_keywords(&self) -> &[String] {
        &self.found
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn progress(&self) -> Progress {
        match &self.active {
            Some(set) => set.progress(&self.found),
            None => KeywordSet::empty("").progress(&self.found),
        }
    }

    fn transition(&mut self, phase: Phase) {
        debug!("Round phase {:?} -> {:?} (epoch {})", self.phase, phase, self.epoch + 1);
        self.phase = phase;
        self.epoch += 1;
    }

    /// Full reset: level 1, score 0, a fresh word, straight into preparation.
    pub fn start(&mut self, words: &mut dyn WordSource) {
        let set = words.next_keyword_set();
        info!("Round started with target word {}", set.target_word);

        self.active = Some(set);
        self.time_remaining = self.duration;
        self.found.clear();
        self.score = 0;
        self.level = 1;
        self.transition(Phase::Preparation);
    }

    /// Word shown, the 3-2-1 countdown begins.
    pub fn begin_countdown(&mut self) -> bool {
        if self.phase != Phase::Preparation {
            return false;
        }
        self.transition(Phase::Countdown);
        true
    }

    /// The presentation sequence finished; the round clock starts.
    pub fn on_presentation_complete(&mut self) -> bool {
        if !matches!(self.phase, Phase::Preparation | Phase::Countdown) {
            return false;
        }
        self.transition(Phase::Playing);
        true
    }

    fn has_won(&self) -> bool {
        match &self.active {
            // An empty set is never winnable.
            Some(set) if !set.keywords.is_empty() => self.found.len() >= set.keywords.len(),
            _ => false,
        }
    }

    fn advance_level(&mut self, words: &mut dyn WordSource) {
        let set = words.next_keyword_set();
        self.level += 1;
        info!(
            "Level {} reached with score {}, next target word {}",
            self.level, self.score, set.target_word
        );

        self.active = Some(set);
        self.found.clear();
        self.time_remaining = self.duration;
        self.transition(Phase::Preparation);
    }

    /// One second of play. The win check runs before the clock so a level
    /// completed on the last second still counts.
    pub fn on_tick(&mut self, words: &mut dyn WordSource) -> TickOutcome {
        if self.phase != Phase::Playing {
            return TickOutcome::Ignored;
        }

        if self.has_won() {
            self.advance_level(words);
            return TickOutcome::LevelComplete { level: self.level };
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            info!("Round finished at level {} with score {}", self.level, self.score);
            self.transition(Phase::Finished);
            return TickOutcome::Finished;
        }

        TickOutcome::Ticked { time_remaining: self.time_remaining }
    }

    /// Check a typed word without applying it.
    pub fn validate(&self, raw: &str) -> ValidationResult {
        match &self.active {
            Some(set) => validate(set, &self.found, raw),
            None => validate(&KeywordSet::empty(""), &self.found, raw),
        }
    }

    /// Validate and apply a typed word. `None` when the round is not playing.
    ///
    /// Finding the last keyword advances the level right away; the tick-time
    /// check covers anything that slips past this.
    pub fn submit_word(
        &mut self,
        raw: &str,
        words: &mut dyn WordSource,
    ) -> Option<ValidationResult> {
        if self.phase != Phase::Playing {
            return None;
        }

        let result = self.validate(raw);
        if result.accepted {
            self.found.push(result.normalized_word.clone());
            self.score += 1;
            if self.has_won() {
                self.advance_level(words);
            }
        }

        Some(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::catalog::tests::set;
    use crate::services::catalog::Catalog;
    use crate::services::validator::RejectReason;
    use std::collections::VecDeque;

    /// Hands out keyword sets in a fixed order and remembers what it issued.
    pub(crate) struct QueuedWords {
        queue: VecDeque<KeywordSet>,
        pub(crate) issued: Vec<String>,
    }

    impl QueuedWords {
        pub(crate) fn new(sets: Vec<KeywordSet>) -> Self {
            Self { queue: sets.into(), issued: Vec::new() }
        }
    }

    impl WordSource for QueuedWords {
        fn next_keyword_set(&mut self) -> KeywordSet {
            let next = self.queue.pop_front().unwrap_or_else(|| set("Spare", &["extra"]));
            self.issued.push(next.target_word.clone());
            next
        }
    }

    fn builtin(words: &[&str]) -> QueuedWords {
        let catalog = Catalog::builtin();
        QueuedWords::new(words.iter().map(|w| catalog.lookup_or_empty(w)).collect())
    }

    fn playing(duration: u32, words: &mut QueuedWords) -> Round {
        let mut round = Round::new(duration);
        round.start(words);
        assert!(round.on_presentation_complete());
        round
    }

    #[test]
    fn test_new_round_is_waiting() {
        let round = Round::default();
        assert_eq!(round.phase(), Phase::Waiting);
        assert_eq!(round.target_word(), None);
        assert_eq!(round.time_remaining(), ROUND_DURATION_SECS);
        assert_eq!(round.level(), 1);
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn test_start_enters_preparation() {
        let mut words = builtin(&["Cat"]);
        let mut round = Round::default();
        round.start(&mut words);
        assert_eq!(round.phase(), Phase::Preparation);
        assert_eq!(round.target_word(), Some("Cat"));
        assert_eq!(round.time_remaining(), 20);
        assert!(round.found_keywords().is_empty());
    }

    #[test]
    fn test_presentation_sequence() {
        let mut words = builtin(&["Cat"]);
        let mut round = Round::default();
        assert!(!round.begin_countdown());
        assert!(!round.on_presentation_complete());

        round.start(&mut words);
        assert!(round.begin_countdown());
        assert_eq!(round.phase(), Phase::Countdown);
        assert!(!round.begin_countdown());
        assert!(round.on_presentation_complete());
        assert_eq!(round.phase(), Phase::Playing);
        assert!(!round.on_presentation_complete());
    }

    #[test]
    fn test_submission_outside_playing_is_ignored() {
        let mut words = builtin(&["Cat"]);
        let mut round = Round::default();
        assert_eq!(round.submit_word("feline", &mut words), None);
        round.start(&mut words);
        assert_eq!(round.submit_word("feline", &mut words), None);
        assert_eq!(round.score(), 0);
        assert!(round.found_keywords().is_empty());
    }

    #[test]
    fn test_tick_outside_playing_is_ignored() {
        let mut words = builtin(&["Cat"]);
        let mut round = Round::new(1);
        assert_eq!(round.on_tick(&mut words), TickOutcome::Ignored);
        round.start(&mut words);
        assert_eq!(round.on_tick(&mut words), TickOutcome::Ignored);
        assert_eq!(round.time_remaining(), 1);
    }

    #[test]
    fn test_tick_decrements_by_one() {
        let mut words = builtin(&["Cat"]);
        let mut round = playing(20, &mut words);
        assert_eq!(round.on_tick(&mut words), TickOutcome::Ticked { time_remaining: 19 });
        assert_eq!(round.on_tick(&mut words), TickOutcome::Ticked { time_remaining: 18 });
        assert_eq!(round.phase(), Phase::Playing);
    }

    #[test]
    fn test_timeout_finishes_and_freezes_clock() {
        let mut words = builtin(&["Cat"]);
        let mut round = playing(1, &mut words);
        assert_eq!(round.on_tick(&mut words), TickOutcome::Finished);
        assert_eq!(round.phase(), Phase::Finished);
        assert_eq!(round.time_remaining(), 0);

        assert_eq!(round.on_tick(&mut words), TickOutcome::Ignored);
        assert_eq!(round.time_remaining(), 0);
        assert_eq!(round.submit_word("feline", &mut words), None);
    }

    #[test]
    fn test_cat_scenario() {
        let mut words = builtin(&["Cat", "Dog"]);
        let mut round = playing(20, &mut words);

        let first = round.submit_word("Feline", &mut words).unwrap();
        assert!(first.accepted);
        assert_eq!(round.score(), 1);

        let target = round.submit_word("cat", &mut words).unwrap();
        assert_eq!(target.reason, Some(RejectReason::TargetWordReused));

        let partial = round.submit_word("fe", &mut words).unwrap();
        assert_eq!(partial.reason, Some(RejectReason::NotAMatch));

        for word in ["pet", "whiskers", "meow"] {
            assert!(round.submit_word(word, &mut words).unwrap().accepted);
            assert_eq!(round.phase(), Phase::Playing);
        }
        assert_eq!(round.found_keywords(), ["feline", "pet", "whiskers", "meow"]);

        assert!(round.submit_word("PURR", &mut words).unwrap().accepted);
        assert_eq!(round.phase(), Phase::Preparation);
        assert_eq!(round.level(), 2);
        assert_eq!(round.score(), 5);
        assert_eq!(round.target_word(), Some("Dog"));
        assert!(round.found_keywords().is_empty());
        assert_eq!(round.time_remaining(), 20);
    }

    #[test]
    fn test_duplicate_is_rejected_and_not_scored() {
        let mut words = builtin(&["Cat"]);
        let mut round = playing(20, &mut words);
        assert!(round.submit_word("meow", &mut words).unwrap().accepted);
        let again = round.submit_word("MEOW", &mut words).unwrap();
        assert_eq!(again.reason, Some(RejectReason::AlreadyUsed));
        assert_eq!(round.score(), 1);
        assert_eq!(round.found_keywords(), ["meow"]);
    }

    #[test]
    fn test_win_on_tick_takes_priority_over_timeout() {
        let mut words = QueuedWords::new(vec![set("Abc", &["one", "two"]), set("Next", &["x1"])]);
        let mut round = Round::new(1);
        round.start(&mut words);
        round.on_presentation_complete();

        // Fill the found set directly so only the tick can see the win.
        round.found = vec!["one".to_string(), "two".to_string()];
        round.score = 2;

        assert_eq!(round.on_tick(&mut words), TickOutcome::LevelComplete { level: 2 });
        assert_eq!(round.phase(), Phase::Preparation);
        assert_eq!(round.time_remaining(), 1);
        assert_eq!(round.score(), 2);
        assert_eq!(round.target_word(), Some("Next"));
    }

    #[test]
    fn test_empty_keyword_set_only_times_out() {
        let mut words = QueuedWords::new(vec![KeywordSet::empty("Platypus")]);
        let mut round = playing(2, &mut words);
        let result = round.submit_word("bill", &mut words).unwrap();
        assert_eq!(result.reason, Some(RejectReason::NotAMatch));
        assert_eq!(round.on_tick(&mut words), TickOutcome::Ticked { time_remaining: 1 });
        assert_eq!(round.on_tick(&mut words), TickOutcome::Finished);
        assert_eq!(round.level(), 1);
    }

    #[test]
    fn test_score_accumulates_across_levels_and_resets_on_start() {
        let mut words = QueuedWords::new(vec![
            set("One", &["aa", "bb"]),
            set("Two", &["cc"]),
            set("Three", &["dd"]),
            set("Four", &["ee"]),
        ]);
        let mut round = playing(20, &mut words);
        round.submit_word("aa", &mut words);
        round.submit_word("bb", &mut words);
        round.on_presentation_complete();
        round.submit_word("cc", &mut words);
        assert_eq!(round.level(), 3);
        assert_eq!(round.score(), 3);

        round.start(&mut words);
        assert_eq!(round.level(), 1);
        assert_eq!(round.score(), 0);
        assert_eq!(round.target_word(), Some("Four"));
        assert_eq!(words.issued, vec!["One", "Two", "Three", "Four"]);
    }

    #[test]
    fn test_epoch_moves_on_every_transition() {
        let mut words = builtin(&["Cat", "Dog"]);
        let mut round = Round::default();
        let e0 = round.epoch();
        round.start(&mut words);
        let e1 = round.epoch();
        round.begin_countdown();
        let e2 = round.epoch();
        round.on_presentation_complete();
        let e3 = round.epoch();
        round.on_tick(&mut words);
        assert_eq!(round.epoch(), e3);
        round.start(&mut words);
        assert!(e0 < e1 && e1 < e2 && e2 < e3 && e3 < round.epoch());
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let mut words = builtin(&["Cat"]);
        let mut round = playing(20, &mut words);
        round.submit_word("purr", &mut words);
        let first = (
            round.phase(),
            round.score(),
            round.level(),
            round.time_remaining(),
            round.found_keywords().to_vec(),
            round.target_word().map(str::to_string),
        );
        for _ in 0..3 {
            let again = (
                round.phase(),
                round.score(),
                round.level(),
                round.time_remaining(),
                round.found_keywords().to_vec(),
                round.target_word().map(str::to_string),
            );
            assert_eq!(first, again);
        }
    }
}
