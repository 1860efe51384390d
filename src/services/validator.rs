use std::fmt;

use serde::Serialize;

use crate::services::catalog::KeywordSet;
use crate::utils::normalize_word;

pub const MIN_WORD_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    TargetWordReused,
    TooShort,
    AlreadyUsed,
    NotAMatch,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::TargetWordReused => "Can't use the target word itself",
            Self::TooShort => "Word too short",
            Self::AlreadyUsed => "Word already used",
            Self::NotAMatch => "Not a related keyword",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetWordReused => write!(f, "TARGET_WORD_REUSED"),
            Self::TooShort => write!(f, "TOO_SHORT"),
            Self::AlreadyUsed => write!(f, "ALREADY_USED"),
            Self::NotAMatch => write!(f, "NOT_A_MATCH"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub normalized_word: String,
    pub accepted: bool,
    pub reason: Option<RejectReason>,
    /// Player-facing text for `reason`.
    pub message: Option<&'static str>,
}

impl ValidationResult {
    fn accept(word: String) -> Self {
        Self { normalized_word: word, accepted: true, reason: None, message: None }
    }

    fn reject(word: String, reason: RejectReason) -> Self {
        Self {
            normalized_word: word,
            accepted: false,
            reason: Some(reason),
            message: Some(reason.message()),
        }
    }
}

/// Judge a typed word against the active keyword set and the words already found.
/// Checks run in a fixed order and the first failing one names the reason.
pub fn validate(active: &KeywordSet, found: &[String], raw: &str) -> ValidationResult {
    let word = normalize_word(raw);

    if word == active.target_word.to_lowercase() {
        return ValidationResult::reject(word, RejectReason::TargetWordReused);
    }

    if word.chars().count() < MIN_WORD_LEN {
        return ValidationResult::reject(word, RejectReason::TooShort);
    }

    if found.contains(&word) {
        return ValidationResult::reject(word, RejectReason::AlreadyUsed);
    }

    if !active.is_keyword(&word) {
        return ValidationResult::reject(word, RejectReason::NotAMatch);
    }

    ValidationResult::accept(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::Catalog;

    fn cat() -> KeywordSet {
        Catalog::builtin().lookup_or_empty("Cat")
    }

    #[test]
    fn test_accepts_keyword_in_any_case() {
        for raw in ["feline", "FELINE", "  Feline  "] {
            let result = validate(&cat(), &[], raw);
            assert!(result.accepted);
            assert_eq!(result.normalized_word, "feline");
            assert_eq!(result.reason, None);
        }
    }

    #[test]
    fn test_second_submission_is_already_used() {
        let found = vec!["meow".to_string()];
        let result = validate(&cat(), &found, "Meow");
        assert_eq!(result.reason, Some(RejectReason::AlreadyUsed));
    }

    #[test]
    fn test_target_word_rejected_in_any_case() {
        for raw in ["cat", "CAT", " Cat "] {
            assert_eq!(
                validate(&cat(), &[], raw).reason,
                Some(RejectReason::TargetWordReused)
            );
        }
    }

    #[test]
    fn test_short_and_blank_words() {
        for raw in ["", " ", "a", " p "] {
            assert_eq!(validate(&cat(), &[], raw).reason, Some(RejectReason::TooShort));
        }
    }

    #[test]
    fn test_not_a_match() {
        assert_eq!(validate(&cat(), &[], "fe").reason, Some(RejectReason::NotAMatch));
        assert_eq!(validate(&cat(), &[], "bark").reason, Some(RejectReason::NotAMatch));
    }

    #[test]
    fn test_target_check_wins_over_length() {
        let one_letter = KeywordSet::empty("A");
        assert_eq!(
            validate(&one_letter, &[], "a").reason,
            Some(RejectReason::TargetWordReused)
        );
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let unknown = KeywordSet::empty("Platypus");
        assert_eq!(validate(&unknown, &[], "bill").reason, Some(RejectReason::NotAMatch));
    }

    #[test]
    fn test_reason_codes_render() {
        assert_eq!(RejectReason::NotAMatch.to_string(), "NOT_A_MATCH");
        assert_eq!(
            serde_json::to_string(&RejectReason::TargetWordReused).unwrap(),
            "\"TARGET_WORD_REUSED\""
        );
        assert_eq!(RejectReason::TooShort.message(), "Word too short");
    }
}
