use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::validator::MIN_WORD_LEN;
use crate::utils::normalize_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// A target word and the keywords that count as associations for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSet {
    pub target_word: String,
    pub difficulty: Difficulty,
    pub keywords: Vec<String>,
    pub description: String,
}

impl KeywordSet {
    /// Stand-in for a target word the catalog does not know. Nothing matches it.
    pub fn empty(target_word: &str) -> Self {
        Self {
            target_word: target_word.to_string(),
            difficulty: Difficulty::Easy,
            keywords: Vec::new(),
            description: String::new(),
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == word)
    }

    /// Keywords not yet covered by `typed`, in catalog order.
    pub fn remaining_keywords(&self, typed: &[String]) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !typed.iter().any(|t| t.to_lowercase() == k.to_lowercase()))
            .cloned()
            .collect()
    }

    pub fn progress(&self, typed: &[String]) -> Progress {
        let correct = typed.iter().filter(|t| self.is_keyword(t)).count();
        let total = self.keywords.len();
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };
        Progress { correct, total, percentage }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog has no entries")]
    Empty,

    #[error("Duplicate target word: {0}")]
    DuplicateTarget(String),

    #[error("Target word has no keywords: {0}")]
    NoKeywords(String),

    #[error("Keyword '{keyword}' is listed twice for {target}")]
    DuplicateKeyword { target: String, keyword: String },

    #[error("Keyword '{keyword}' can never be accepted for {target}")]
    UnplayableKeyword { target: String, keyword: String },
}

/// The keyword database. Never empty once constructed.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<KeywordSet>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<KeywordSet>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.target_word.to_lowercase()) {
                return Err(CatalogError::DuplicateTarget(entry.target_word.clone()));
            }
            if entry.keywords.is_empty() {
                return Err(CatalogError::NoKeywords(entry.target_word.clone()));
            }
            check_keywords(entry)?;
        }

        Ok(Self { entries })
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(target, difficulty, keywords, description)| KeywordSet {
                target_word: target.to_string(),
                difficulty: *difficulty,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                description: description.to_string(),
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, target_word: &str) -> Option<&KeywordSet> {
        let target_word = target_word.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.target_word.to_lowercase() == target_word)
    }

    /// Lookup that degrades to an empty keyword set.
    pub fn lookup_or_empty(&self, target_word: &str) -> KeywordSet {
        self.lookup(target_word)
            .cloned()
            .unwrap_or_else(|| KeywordSet::empty(target_word))
    }

    pub fn all_entries(&self) -> &[KeywordSet] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn count_by_difficulty(&self, difficulty: Difficulty) -> usize {
        self.entries.iter().filter(|e| e.difficulty == difficulty).count()
    }

    pub fn is_keyword_match(&self, target_word: &str, typed: &str) -> bool {
        self.lookup_or_empty(target_word).is_keyword(typed)
    }
}

/// Every keyword must be acceptable exactly once, or the level can't be won.
fn check_keywords(entry: &KeywordSet) -> Result<(), CatalogError> {
    let target = entry.target_word.to_lowercase();
    let mut seen = HashSet::new();
    for keyword in &entry.keywords {
        let word = normalize_word(keyword);
        if word == target || word.chars().count() < MIN_WORD_LEN {
            return Err(CatalogError::UnplayableKeyword {
                target: entry.target_word.clone(),
                keyword: keyword.clone(),
            });
        }
        if !seen.insert(word) {
            return Err(CatalogError::DuplicateKeyword {
                target: entry.target_word.clone(),
                keyword: keyword.clone(),
            });
        }
    }
    Ok(())
}

type Entry = (&'static str, Difficulty, [&'static str; 5], &'static str);

const BUILTIN: &[Entry] = &[
    ("Cat", Difficulty::Easy, ["feline", "pet", "whiskers", "meow", "purr"],
        "Type words related to cats! Think about what cats look like, sound like, or do."),
    ("Dog", Difficulty::Easy, ["canine", "pet", "bark", "tail", "paws"],
        "Type words related to dogs! Think about what dogs look like, sound like, or do."),
    ("Tree", Difficulty::Easy, ["leaves", "branches", "trunk", "roots", "bark"],
        "Type words related to trees! Think about what trees look like and their parts."),
    ("Sun", Difficulty::Easy, ["bright", "hot", "yellow", "day", "light"],
        "Type words related to the sun! Think about what the sun does and looks like."),
    ("Water", Difficulty::Easy, ["liquid", "wet", "blue", "drink", "ocean"],
        "Type words related to water! Think about what water is and where you find it."),
    ("Food", Difficulty::Easy, ["eat", "hungry", "taste", "cook", "meal"],
        "Type words related to food! Think about what you do with food and how it tastes."),
    ("Music", Difficulty::Easy, ["song", "melody", "rhythm", "instrument", "band"],
        "Type words related to music! Think about what music sounds like and how you enjoy it."),
    ("Book", Difficulty::Easy, ["read", "pages", "story", "author", "library"],
        "Type words related to books! Think about what you do with books and what they contain."),
    ("House", Difficulty::Easy, ["home", "roof", "door", "windows", "family"],
        "Type words related to houses! Think about what houses look like and what they provide."),
    ("Car", Difficulty::Easy, ["drive", "wheels", "engine", "road", "speed"],
        "Type words related to cars! Think about what cars do and their parts."),
    ("Ocean", Difficulty::Medium, ["waves", "deep", "blue", "salt", "fish"],
        "Type words related to oceans! Think about what oceans contain and their characteristics."),
    ("Technology", Difficulty::Medium, ["computer", "digital", "innovation", "software", "internet"],
        "Type words related to technology! Think about modern tools and digital systems."),
    ("Adventure", Difficulty::Medium, ["explore", "journey", "exciting", "discover", "travel"],
        "Type words related to adventure! Think about exciting experiences and exploration."),
    ("Harmony", Difficulty::Medium, ["balance", "peace", "unity", "agreement", "melody"],
        "Type words related to harmony! Think about balance, peace, and things working together."),
    ("Compassion", Difficulty::Medium, ["empathy", "kindness", "caring", "understanding", "sympathy"],
        "Type words related to compassion! Think about caring for others and showing kindness."),
    ("Innovation", Difficulty::Medium, ["creativity", "invention", "progress", "breakthrough", "original"],
        "Type words related to innovation! Think about new ideas and creative solutions."),
    ("Wisdom", Difficulty::Medium, ["knowledge", "insight", "understanding", "experience", "judgment"],
        "Type words related to wisdom! Think about deep understanding and good judgment."),
    ("Celebration", Difficulty::Medium, ["festival", "party", "joy", "happiness", "ceremony"],
        "Type words related to celebration! Think about joyful events and special occasions."),
    ("Quantum", Difficulty::Hard, ["physics", "particle", "energy", "subatomic", "uncertainty"],
        "Type words related to quantum! Think about advanced physics and subatomic phenomena."),
    ("Metaphysics", Difficulty::Hard, ["philosophy", "reality", "existence", "consciousness", "being"],
        "Type words related to metaphysics! Think about fundamental questions about reality and existence."),
    ("Sustainability", Difficulty::Hard, ["environment", "conservation", "renewable", "ecological", "green"],
        "Type words related to sustainability! Think about environmental responsibility and long-term thinking."),
    ("Globalization", Difficulty::Hard, ["international", "worldwide", "interconnected", "trade", "culture"],
        "Type words related to globalization! Think about worldwide connections and international integration."),
    ("Consciousness", Difficulty::Hard, ["awareness", "mind", "perception", "cognition", "subjective"],
        "Type words related to consciousness! Think about awareness, mind, and subjective experience."),
    ("Cryptography", Difficulty::Hard, ["encryption", "security", "code", "cipher", "algorithm"],
        "Type words related to cryptography! Think about digital security and data protection."),
    ("Biodiversity", Difficulty::Hard, ["ecosystem", "species", "variety", "genetic", "conservation"],
        "Type words related to biodiversity! Think about the variety of life and ecological systems."),
    ("Epistemology", Difficulty::Hard, ["knowledge", "truth", "belief", "justification", "philosophy"],
        "Type words related to epistemology! Think about the nature of knowledge and how we know things."),
];

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn set(target: &str, keywords: &[&str]) -> KeywordSet {
        KeywordSet {
            target_word: target.to_string(),
            difficulty: Difficulty::Easy,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: String::new(),
        }
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 26);
        assert_eq!(catalog.count_by_difficulty(Difficulty::Easy), 10);
        assert_eq!(catalog.count_by_difficulty(Difficulty::Medium), 8);
        assert_eq!(catalog.count_by_difficulty(Difficulty::Hard), 8);
        assert!(Catalog::from_entries(catalog.all_entries().to_vec()).is_ok());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let cat = catalog.lookup("cAT").expect("cat is in the catalog");
        assert_eq!(cat.target_word, "Cat");
        assert!(catalog.lookup("Platypus").is_none());
    }

    #[test]
    fn test_unknown_lookup_degrades_to_empty_set() {
        let catalog = Catalog::builtin();
        let missing = catalog.lookup_or_empty("Platypus");
        assert_eq!(missing.target_word, "Platypus");
        assert!(missing.keywords.is_empty());
        assert!(!catalog.is_keyword_match("Platypus", "bill"));
    }

    #[test]
    fn test_keyword_match() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_keyword_match("Cat", "MEOW"));
        assert!(catalog.is_keyword_match("cat", "whiskers"));
        assert!(!catalog.is_keyword_match("Cat", "bark"));
    }

    #[test]
    fn test_remaining_and_progress() {
        let cat = Catalog::builtin().lookup_or_empty("Cat");
        let typed = vec!["feline".to_string(), "PET".to_string(), "nope".to_string()];
        assert_eq!(cat.remaining_keywords(&typed), vec!["whiskers", "meow", "purr"]);
        assert_eq!(
            cat.progress(&typed),
            Progress { correct: 2, total: 5, percentage: 40 }
        );
        assert_eq!(
            KeywordSet::empty("x").progress(&typed),
            Progress { correct: 0, total: 0, percentage: 0 }
        );
    }

    #[test]
    fn test_from_entries_rejects_bad_catalogs() {
        assert!(matches!(Catalog::from_entries(vec![]), Err(CatalogError::Empty)));

        let dup = vec![set("Cat", &["pet"]), set("cat", &["meow"])];
        assert!(matches!(
            Catalog::from_entries(dup),
            Err(CatalogError::DuplicateTarget(word)) if word == "cat"
        ));

        let bare = vec![set("Cat", &[])];
        assert!(matches!(
            Catalog::from_entries(bare),
            Err(CatalogError::NoKeywords(word)) if word == "Cat"
        ));
    }

    #[test]
    fn test_from_entries_rejects_unwinnable_keyword_lists() {
        let repeated = vec![set("Moon", &["Night", "night", "crater"])];
        assert!(matches!(
            Catalog::from_entries(repeated),
            Err(CatalogError::DuplicateKeyword { keyword, .. }) if keyword == "night"
        ));

        let itself = vec![set("Moon", &["crater", "MOON"])];
        assert!(matches!(
            Catalog::from_entries(itself),
            Err(CatalogError::UnplayableKeyword { keyword, .. }) if keyword == "MOON"
        ));

        let short = vec![set("Moon", &["crater", "x"])];
        assert!(matches!(
            Catalog::from_entries(short),
            Err(CatalogError::UnplayableKeyword { target, keyword }) if target == "Moon" && keyword == "x"
        ));
    }
}
