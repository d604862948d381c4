//! Reading-time estimation.
//!
//! Minutes are `ceil(words / 200)`, where a word is any whitespace-delimited
//! token. Markdown markup counts toward the total like any other token.

use serde::{Deserialize, Serialize};

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Word and minute counts for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTimeReport {
    /// Whitespace-delimited tokens.
    pub words: usize,
    /// Estimated minutes, rounded up.
    pub minutes: u32,
}

impl ReadingTimeReport {
    /// Measure `text`.
    pub fn measure(text: &str) -> Self {
        let words = word_count(text);
        Self {
            words,
            minutes: minutes_for(words),
        }
    }
}

/// Count whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated reading time in whole minutes.
pub fn reading_time(text: &str) -> u32 {
    minutes_for(word_count(text))
}

fn minutes_for(words: usize) -> u32 {
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}
