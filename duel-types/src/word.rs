use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// One description per difficulty tier. Which tier is shown depends on the
/// word's position in the duel, not on the word itself.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Descriptions {
    pub easy: String,
    pub medium: String,
    pub hard: String,
}

impl Descriptions {
    pub fn for_tier(&self, tier: Difficulty) -> &str {
        match tier {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// A catalog entry. Read-only from the game's perspective; the word text
/// itself is the identifier used in `words_order`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Word {
    pub word: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub descriptions: Descriptions,
    pub hint: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// The full content catalog, grouped by difficulty tier the way the content
/// store serves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordCatalog {
    pub easy: Vec<Word>,
    pub medium: Vec<Word>,
    pub hard: Vec<Word>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl WordCatalog {
    pub fn tier(&self, tier: Difficulty) -> &[Word] {
        match tier {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn all_words(&self) -> impl Iterator<Item = &Word> {
        self.easy.iter().chain(self.medium.iter()).chain(self.hard.iter())
    }

    /// Look up a catalog entry by its word text.
    pub fn find(&self, word: &str) -> Option<&Word> {
        self.all_words().find(|w| w.word == word)
    }

    /// Count of distinct word identifiers across all tiers.
    pub fn distinct_words(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.all_words().filter(|w| seen.insert(w.word.as_str())).count()
    }

    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.easy.is_empty() && self.medium.is_empty() && self.hard.is_empty()
    }
}
