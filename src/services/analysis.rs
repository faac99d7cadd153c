// Local text analysis
//
// Rough numbers computed on the client when the backend analyzer cannot be
// used. Deliberately simple: word and sentence counts plus a two-level
// difficulty rating.

use crate::models::{FallbackReason, LocalAnalysis};

/// Words per minute used for the reading-time estimate.
pub const READING_WORDS_PER_MINUTE: usize = 200;

/// Above this many words a text counts as advanced.
pub const ADVANCED_WORD_THRESHOLD: usize = 50;

const TIPS: [&str; 2] = [
    "Great job analyzing this text!",
    "Keep practicing your reading skills!",
];

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Non-empty pieces between periods.
pub fn sentence_count(text: &str) -> usize {
    text.split('.').filter(|piece| !piece.trim().is_empty()).count()
}

pub fn local_analysis(text: &str, reason: FallbackReason) -> LocalAnalysis {
    let words = word_count(text);
    let advanced = words > ADVANCED_WORD_THRESHOLD;

    LocalAnalysis {
        word_count: words,
        sentence_count: sentence_count(text),
        reading_time_minutes: (words / READING_WORDS_PER_MINUTE).max(1),
        reading_level: if advanced { "Advanced" } else { "Beginner" },
        difficulty: if advanced { "Hard" } else { "Easy" },
        tips: TIPS.to_vec(),
        reason,
    }
}
