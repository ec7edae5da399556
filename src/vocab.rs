//! Vocabulary source — the immutable English–German word list.
//!
//! Loaded once at process start from `words.json`, a JSON array of
//! two-element arrays: `[["apple", "Apfel"], ...]`. Held behind an `Arc` and
//! shared read-only by every session; a reload is out of scope.

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::AppError;

/// One immutable English–German pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub english: String,
    pub german: String,
}

/// Which language is shown as the prompt for a whole session.
///
/// Decided by coin flip when a session starts and held constant across all
/// of its questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    EnglishToGerman,
    GermanToEnglish,
}

impl Direction {
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) {
            Self::EnglishToGerman
        } else {
            Self::GermanToEnglish
        }
    }

    /// The word shown to the user.
    pub fn prompt<'a>(&self, pair: &'a WordPair) -> &'a str {
        match self {
            Self::EnglishToGerman => &pair.english,
            Self::GermanToEnglish => &pair.german,
        }
    }

    /// The word expected as the answer.
    pub fn expected<'a>(&self, pair: &'a WordPair) -> &'a str {
        match self {
            Self::EnglishToGerman => &pair.german,
            Self::GermanToEnglish => &pair.english,
        }
    }

    /// Language the user is asked to answer in, for the quiz header.
    pub fn answer_language(&self) -> &'static str {
        match self {
            Self::EnglishToGerman => "German",
            Self::GermanToEnglish => "English",
        }
    }
}

/// The loaded word list.
#[derive(Debug)]
pub struct Vocabulary {
    pairs: Vec<WordPair>,
}

impl Vocabulary {
    /// Load the word list from `path`.
    ///
    /// A missing or malformed file is a load error — the process must not
    /// start without a usable list.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Vocabulary(format!("cannot read {}: {e}", path.display())))?;
        let entries: Vec<(String, String)> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Vocabulary(format!("malformed {}: {e}", path.display())))?;
        Ok(Self::from_pairs(
            entries
                .into_iter()
                .map(|(english, german)| WordPair { english, german })
                .collect(),
        ))
    }

    pub fn from_pairs(pairs: Vec<WordPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sample `count` distinct pairs uniformly at random without replacement.
    ///
    /// Fails cleanly when the list holds fewer than `count` entries — never
    /// returns a partially-filled sample.
    pub fn sample(&self, count: usize, rng: &mut impl Rng) -> Result<Vec<WordPair>, AppError> {
        if self.pairs.len() < count {
            return Err(AppError::InsufficientVocabulary {
                available: self.pairs.len(),
                required: count,
            });
        }
        Ok(self.pairs.choose_multiple(rng, count).cloned().collect())
    }
}
