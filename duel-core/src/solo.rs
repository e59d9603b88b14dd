//! Single-player timed quiz over the same selector and matcher as the
//! duel. Runs entirely in one client; nothing is persisted or shared.

use duel_types::{Difficulty, Word};

use crate::consts::{HINTS_PER_WORD, POINTS_PER_WORD, SOLO_HINT_PENALTY};
use crate::hints::HintBudget;
use crate::matcher;
use crate::selector::description_tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloStatus {
    Countdown,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloGuess {
    pub is_correct: bool,
    pub points: i32,
}

/// Solo scoring: full award minus a penalty per hint used, floored at zero.
pub fn solo_score(correct: bool, hints_used: usize) -> i32 {
    if !correct {
        return 0;
    }
    (POINTS_PER_WORD - SOLO_HINT_PENALTY * hints_used as i32).max(0)
}

#[derive(Debug)]
pub struct SoloSession {
    words: Vec<Word>,
    current_index: usize,
    score: i32,
    correct_answers: usize,
    status: SoloStatus,
    hints: HintBudget,
}

impl SoloSession {
    /// A session over an already-selected word sequence (easy words first,
    /// per the selector's ordering).
    pub fn new(words: Vec<Word>) -> Self {
        let hints = words.first().map(HintBudget::for_word).unwrap_or_default();
        let status = if words.is_empty() {
            SoloStatus::Finished
        } else {
            SoloStatus::Countdown
        };
        Self {
            words,
            current_index: 0,
            score: 0,
            correct_answers: 0,
            status,
            hints,
        }
    }

    /// Countdown finished; words start being presented.
    pub fn begin(&mut self) {
        if self.status == SoloStatus::Countdown {
            self.status = SoloStatus::Playing;
        }
    }

    pub fn status(&self) -> SoloStatus {
        self.status
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn current_word(&self) -> Option<&Word> {
        if self.status != SoloStatus::Playing {
            return None;
        }
        self.words.get(self.current_index)
    }

    /// Description shown for the current word, tiered by position.
    pub fn current_description(&self) -> Option<&str> {
        let word = self.current_word()?;
        let tier: Difficulty = description_tier(self.current_index as i32);
        Some(word.descriptions.for_tier(tier))
    }

    /// Reveal the next hint for the current word, if the budget allows.
    pub fn use_hint(&mut self) -> Option<String> {
        if self.status != SoloStatus::Playing {
            return None;
        }
        self.hints.reveal_next().map(str::to_string)
    }

    pub fn hints_used(&self) -> usize {
        self.hints.used()
    }

    /// Check a guess against the current word. A correct answer scores
    /// (penalized per hint used) and advances; an incorrect one changes
    /// nothing and may be retried.
    pub fn check_guess(&mut self, guess: &str) -> Option<SoloGuess> {
        let word = self.current_word()?;
        let correct = matcher::is_correct(guess, &word.word, &word.synonyms);
        if !correct {
            return Some(SoloGuess {
                is_correct: false,
                points: 0,
            });
        }

        let points = solo_score(true, self.hints.used());
        self.score += points;
        self.correct_answers += 1;
        self.advance();
        Some(SoloGuess {
            is_correct: true,
            points,
        })
    }

    /// The per-word timer ran out (or the player skipped); move on with no
    /// score change.
    pub fn skip(&mut self) {
        if self.status == SoloStatus::Playing {
            self.advance();
        }
    }

    fn advance(&mut self) {
        let next = self.current_index + 1;
        if next < self.words.len() {
            self.current_index = next;
            self.hints = HintBudget::for_word(&self.words[next]);
            debug_assert!(self.hints.remaining() <= HINTS_PER_WORD);
        } else {
            self.status = SoloStatus::Finished;
        }
    }
}
