use serde::Serialize;
use std::collections::BTreeSet;

use quiz_core::model::AnswerState;

use super::plan::SessionQuestion;
use super::service::QuizSession;
use crate::error::{InputError, SessionError};

/// Display marking of one choice after grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceMark {
    Correct,
    Wrong,
    Neutral,
}

/// Order-independent, size-sensitive set comparison.
fn same_set(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Marks for every choice: the correct one always, a wrongly selected one too.
#[must_use]
pub fn choice_marks(question: &SessionQuestion, answer: &AnswerState) -> Vec<ChoiceMark> {
    (0..question.choices.len())
        .map(|idx| {
            if question.is_correct_choice(idx) {
                ChoiceMark::Correct
            } else if answer.is_selected(idx) {
                ChoiceMark::Wrong
            } else {
                ChoiceMark::Neutral
            }
        })
        .collect()
}

impl QuizSession {
    /// Grade `selected` against question `index` and store the result.
    ///
    /// Overwrites the stored answer unconditionally; callers going through
    /// `submit` never grade a question twice.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoSelection` for an empty selection and
    /// `InputError::*OutOfRange` for unknown indices. Nothing is stored then.
    pub fn grade(&mut self, index: usize, selected: &[usize]) -> Result<AnswerState, SessionError> {
        let len = self.questions.len();
        let question = self
            .questions
            .get(index)
            .ok_or(InputError::QuestionOutOfRange { index, len })?;

        if selected.is_empty() {
            return Err(InputError::NoSelection.into());
        }
        let available = question.choices.len();
        if let Some(&choice) = selected.iter().find(|&&c| c >= available) {
            return Err(InputError::ChoiceOutOfRange { choice, available }.into());
        }

        let correct = same_set(selected, &question.correct_idxs);
        let answer = AnswerState::graded(selected.to_vec(), correct);
        self.answers[index] = answer.clone();
        log::debug!(
            "graded question id={}: {}",
            question.id,
            if correct { "correct" } else { "wrong" }
        );
        Ok(answer)
    }

    /// Choice marks for a graded question; `None` until it is graded.
    #[must_use]
    pub fn choice_marks(&self, index: usize) -> Option<Vec<ChoiceMark>> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(index).filter(|a| a.checked)?;
        Some(choice_marks(question, answer))
    }
}
