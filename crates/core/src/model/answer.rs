use serde::{Deserialize, Serialize};

/// Per-question answer record kept alongside a session.
///
/// At most one index is ever selected: every question, `multi` included,
/// is answered with radio-button semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerState {
    pub selected_idxs: Vec<usize>,
    pub checked: bool,
    pub correct: bool,
    pub skipped: bool,
}

impl AnswerState {
    /// State written by the grading engine.
    #[must_use]
    pub fn graded(selected_idxs: Vec<usize>, correct: bool) -> Self {
        Self {
            selected_idxs,
            checked: true,
            correct,
            skipped: false,
        }
    }

    /// State written when the question is bypassed.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_idxs.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, idx: usize) -> bool {
        self.selected_idxs.contains(&idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_blank() {
        let a = AnswerState::default();
        assert!(!a.checked && !a.correct && !a.skipped);
        assert!(!a.has_selection());
    }

    #[test]
    fn skipped_is_never_checked_or_correct() {
        let a = AnswerState::skipped();
        assert!(a.skipped);
        assert!(!a.checked);
        assert!(!a.correct);
        assert!(a.selected_idxs.is_empty());
    }
}
