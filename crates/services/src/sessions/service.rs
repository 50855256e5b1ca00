use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::AnswerState;

use super::plan::SessionQuestion;
use super::progress::SessionProgress;
use crate::error::{InputError, NavigationError, SessionError};

//
// ─── NAVIGATION STATE ──────────────────────────────────────────────────────────
//

/// Where the player stands in an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavState {
    Viewing { index: usize, graded: bool },
    Finished,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::Viewing { index, graded } => {
                let status = if *graded { "graded" } else { "ungraded" };
                write!(f, "viewing question {} ({status})", index + 1)
            }
            NavState::Finished => f.write_str("finished"),
        }
    }
}

/// User actions that drive the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIntent {
    Select(usize),
    /// Grades an ungraded question, otherwise moves on.
    SubmitOrAdvance,
    Back,
    Skip,
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Selected { choice: usize },
    /// `finished` is set when the graded question was the last one.
    Graded { correct: bool, finished: bool },
    Moved { index: usize },
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt: shuffled questions, parallel answer states and a cursor.
///
/// All mutation goes through the navigation methods; a retry replaces the
/// whole session.
pub struct QuizSession {
    pub(crate) questions: Vec<SessionQuestion>,
    pub(crate) answers: Vec<AnswerState>,
    current: usize,
    finished: bool,
    clock: Clock,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub(crate) fn new(questions: Vec<SessionQuestion>, started_at: DateTime<Utc>) -> Self {
        let answers = vec![AnswerState::default(); questions.len()];
        Self {
            questions,
            answers,
            current: 0,
            finished: false,
            clock: Clock::fixed(started_at),
            started_at,
            finished_at: None,
        }
    }

    pub(crate) fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerState] {
        &self.answers
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&SessionQuestion> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&AnswerState> {
        self.answers.get(index)
    }

    /// 0-based cursor; stays on the last question once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn state(&self) -> NavState {
        if self.finished {
            return NavState::Finished;
        }
        NavState::Viewing {
            index: self.current,
            graded: self.answers[self.current].checked,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::from_answers(&self.answers, self.finished)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }

    fn is_last(&self, index: usize) -> bool {
        index + 1 == self.questions.len()
    }

    fn ungraded_index(&self, action: &'static str) -> Result<usize, NavigationError> {
        match self.state() {
            NavState::Viewing {
                index,
                graded: false,
            } => Ok(index),
            state => Err(NavigationError { action, state }),
        }
    }

    fn finish(&mut self) -> Transition {
        self.finished = true;
        self.finished_at = Some(self.clock.now());
        log::debug!(
            "attempt finished: {}/{} correct",
            self.correct_count(),
            self.len()
        );
        Transition::Finished
    }

    /// Dispatch a user action.
    ///
    /// # Errors
    ///
    /// See the individual actions.
    pub fn dispatch(&mut self, intent: SessionIntent) -> Result<Transition, SessionError> {
        match intent {
            SessionIntent::Select(choice) => self.select(choice),
            SessionIntent::SubmitOrAdvance => self.submit(),
            SessionIntent::Back => Ok(self.back()?),
            SessionIntent::Skip => Ok(self.skip()?),
        }
    }

    /// Choose `choice` for the current ungraded question, replacing any
    /// previous choice and clearing a skip mark.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` unless viewing an ungraded question and
    /// `InputError::ChoiceOutOfRange` for an unknown choice.
    pub fn select(&mut self, choice: usize) -> Result<Transition, SessionError> {
        let index = self.ungraded_index("select")?;
        let available = self.questions[index].choices.len();
        if choice >= available {
            return Err(InputError::ChoiceOutOfRange { choice, available }.into());
        }

        let answer = &mut self.answers[index];
        answer.selected_idxs = vec![choice];
        answer.skipped = false;
        Ok(Transition::Selected { choice })
    }

    /// Grade the current question, or advance past it if already graded.
    ///
    /// Grading the last question finishes the attempt immediately.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoSelection` when nothing is selected (no state
    /// change) and `NavigationError` once finished.
    pub fn submit(&mut self) -> Result<Transition, SessionError> {
        let (index, graded) = match self.state() {
            NavState::Viewing { index, graded } => (index, graded),
            state @ NavState::Finished => {
                return Err(NavigationError {
                    action: "submit",
                    state,
                }
                .into());
            }
        };

        if !graded {
            let selected = self.answers[index].selected_idxs.clone();
            let answer = self.grade(index, &selected)?;
            let finished = self.is_last(index);
            if finished {
                self.finish();
            }
            return Ok(Transition::Graded {
                correct: answer.correct,
                finished,
            });
        }

        if self.is_last(index) {
            return Ok(self.finish());
        }
        self.current += 1;
        log::debug!("moved to question {}", self.current + 1);
        Ok(Transition::Moved {
            index: self.current,
        })
    }

    /// Return to the previous question, keeping its status and selection.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` on the first question or once finished.
    pub fn back(&mut self) -> Result<Transition, NavigationError> {
        match self.state() {
            NavState::Viewing { index, .. } if index > 0 => {
                self.current = index - 1;
                Ok(Transition::Moved {
                    index: self.current,
                })
            }
            state => Err(NavigationError {
                action: "go back",
                state,
            }),
        }
    }

    /// Leave the current question ungraded and move on.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` unless viewing an ungraded question.
    pub fn skip(&mut self) -> Result<Transition, NavigationError> {
        let index = self.ungraded_index("skip")?;
        self.answers[index] = AnswerState::skipped();

        if self.is_last(index) {
            return Ok(self.finish());
        }
        self.current = index + 1;
        Ok(Transition::Moved {
            index: self.current,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("state", &self.state())
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, QuestionId, QuestionKind};
    use quiz_core::time::fixed_now;

    fn question(id: u64, correct: usize, n: usize) -> SessionQuestion {
        SessionQuestion {
            id: QuestionId::from(id),
            kind: QuestionKind::Multi,
            content: format!("Q{id}"),
            choices: (0..n)
                .map(|i| Choice::new(format!("c{i}"), i == correct))
                .collect(),
            correct_idxs: vec![correct],
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new(
            (0..n).map(|i| question(i as u64 + 1, 1, 3)).collect(),
            fixed_now(),
        )
    }

    #[test]
    fn starts_viewing_first_question_ungraded() {
        let s = session(3);
        assert_eq!(s.state(), NavState::Viewing { index: 0, graded: false });
        assert!(s.answers().iter().all(|a| *a == AnswerState::default()));
    }

    #[test]
    fn submit_without_selection_changes_nothing() {
        let mut s = session(2);
        let err = s.submit().unwrap_err();
        assert!(matches!(err, SessionError::Input(InputError::NoSelection)));
        assert_eq!(s.state(), NavState::Viewing { index: 0, graded: false });
    }

    #[test]
    fn submit_grades_then_advances() {
        let mut s = session(2);
        s.select(1).unwrap();
        assert_eq!(
            s.submit().unwrap(),
            Transition::Graded {
                correct: true,
                finished: false
            }
        );
        assert_eq!(s.state(), NavState::Viewing { index: 0, graded: true });
        assert_eq!(s.submit().unwrap(), Transition::Moved { index: 1 });
        assert_eq!(s.state(), NavState::Viewing { index: 1, graded: false });
    }

    #[test]
    fn grading_last_question_finishes() {
        let mut s = session(1);
        s.select(0).unwrap();
        assert_eq!(
            s.submit().unwrap(),
            Transition::Graded {
                correct: false,
                finished: true
            }
        );
        assert_eq!(s.state(), NavState::Finished);
        assert_eq!(s.finished_at(), Some(fixed_now()));
    }

    #[test]
    fn graded_question_is_read_only() {
        let mut s = session(2);
        s.select(2).unwrap();
        s.submit().unwrap();
        let before = s.answer(0).cloned().unwrap();

        assert!(matches!(s.select(1), Err(SessionError::Navigation(_))));
        assert!(s.skip().is_err());
        assert_eq!(s.answer(0), Some(&before));
    }

    #[test]
    fn back_preserves_status_and_selection() {
        let mut s = session(3);
        s.select(2).unwrap();
        s.submit().unwrap();
        s.submit().unwrap();
        s.select(0).unwrap();

        assert_eq!(s.back().unwrap(), Transition::Moved { index: 0 });
        assert_eq!(s.state(), NavState::Viewing { index: 0, graded: true });
        assert_eq!(s.answer(0).unwrap().selected_idxs, vec![2]);
        assert_eq!(s.answer(1).unwrap().selected_idxs, vec![0]);
        assert!(s.back().is_err());
    }

    #[test]
    fn skip_moves_on_without_grading() {
        let mut s = session(2);
        s.select(1).unwrap();
        assert_eq!(s.skip().unwrap(), Transition::Moved { index: 1 });
        let a = s.answer(0).unwrap();
        assert!(a.skipped && !a.checked && !a.correct);
        assert!(a.selected_idxs.is_empty());

        assert_eq!(s.skip().unwrap(), Transition::Finished);
        assert!(s.is_finished());
    }

    #[test]
    fn selecting_after_skip_clears_the_mark() {
        let mut s = session(2);
        s.skip().unwrap();
        s.back().unwrap();
        s.select(0).unwrap();
        assert!(!s.answer(0).unwrap().skipped);
    }

    #[test]
    fn finished_accepts_no_navigation() {
        let mut s = session(1);
        s.skip().unwrap();
        assert!(s.submit().is_err());
        assert!(s.back().is_err());
        assert!(s.skip().is_err());
        assert!(s.dispatch(SessionIntent::Select(0)).is_err());
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let mut s = session(1);
        let err = s.select(3).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Input(InputError::ChoiceOutOfRange {
                choice: 3,
                available: 3
            })
        ));
    }

    #[test]
    fn dispatch_routes_intents() {
        let mut s = session(2);
        assert_eq!(
            s.dispatch(SessionIntent::Select(1)).unwrap(),
            Transition::Selected { choice: 1 }
        );
        assert!(matches!(
            s.dispatch(SessionIntent::SubmitOrAdvance).unwrap(),
            Transition::Graded { correct: true, .. }
        ));
    }

    #[test]
    fn state_display_is_one_based() {
        let s = session(2);
        assert_eq!(s.state().to_string(), "viewing question 1 (ungraded)");
    }
}
