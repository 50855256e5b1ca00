use serde::Serialize;

use quiz_core::model::AnswerState;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub graded: usize,
    pub correct: usize,
    pub skipped: usize,
    /// `round(100 * graded / total)`, 0 for an empty session.
    pub percent: u8,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn from_answers(answers: &[AnswerState], is_complete: bool) -> Self {
        let total = answers.len();
        let graded = answers.iter().filter(|a| a.checked).count();
        Self {
            total,
            graded,
            correct: answers.iter().filter(|a| a.correct).count(),
            skipped: answers.iter().filter(|a| a.skipped).count(),
            percent: percent(graded, total),
            is_complete,
        }
    }
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Half-up rounding in integers.
    let rounded = (200 * part + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
