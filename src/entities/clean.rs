// Entity string cleanup.
//
// Recognized spans come back with articles, possessives, abbreviation dots
// and mixed case ("the U.S.'s", "The United States"). Cleaning folds them to
// one comparable form so frequency counts group the same place together.

use std::collections::HashSet;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

/// Articles and prepositions that never carry meaning inside an entity name.
pub const MINIMAL_STOP_WORDS: [&str; 7] = ["the", "a", "an", "of", "and", "to", "in"];

/// Which stop-word list to remove from entity strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopWordSet {
    /// Articles and a few prepositions only
    #[default]
    Minimal,
    /// Full English list from the stop-words crate
    English,
}

impl StopWordSet {
    pub fn words(self) -> HashSet<String> {
        match self {
            StopWordSet::Minimal => MINIMAL_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            StopWordSet::English => get(LANGUAGE::English).into_iter().collect(),
        }
    }
}

/// Folds raw entity spans into normalized strings.
pub struct EntityCleaner {
    stop_words: HashSet<String>,
    leading_article: Regex,
    possessive: Regex,
}

impl Default for EntityCleaner {
    fn default() -> Self {
        Self::new(StopWordSet::Minimal)
    }
}

impl EntityCleaner {
    pub fn new(stop_words: StopWordSet) -> Self {
        Self::with_words(stop_words.words())
    }

    pub fn with_words(stop_words: HashSet<String>) -> Self {
        Self {
            stop_words,
            leading_article: Regex::new(r"(?i)^(the|an)\s+").expect("valid regex"),
            possessive: Regex::new(r"(?i)['’]s$").expect("valid regex"),
        }
    }

    /// Clean one entity string. Returns `None` if nothing survives.
    ///
    /// Steps: drop a leading article, a trailing possessive and every period;
    /// lowercase; replace punctuation with spaces; drop stop words; rejoin
    /// with single spaces.
    pub fn clean(&self, raw: &str) -> Option<String> {
        let s = raw.trim();
        let s = self.leading_article.replace(s, "");
        let s = self.possessive.replace(&s, "");
        let s = s.replace('.', "").to_lowercase();

        let separated: String = s
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        let tokens: Vec<&str> = separated
            .split_whitespace()
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(" "))
        }
    }
}
