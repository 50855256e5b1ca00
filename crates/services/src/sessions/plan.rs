use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use quiz_core::Clock;
use quiz_core::model::{Choice, QuestionId, QuestionKind, RawQuestion, ValidationError};

use super::service::QuizSession;
use crate::error::SessionError;

/// One question of an attempt, with choices in their final display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub content: String,
    pub choices: Vec<Choice>,
    /// Index of the correct choice after shuffling; always exactly one entry.
    pub correct_idxs: Vec<usize>,
}

impl SessionQuestion {
    #[must_use]
    pub fn is_correct_choice(&self, idx: usize) -> bool {
        self.correct_idxs.contains(&idx)
    }
}

/// Build one randomized attempt over `questions`.
///
/// Question order is shuffled; `multi` choices are shuffled, `truefalse`
/// choices keep manifest order. The input slice is left as is.
///
/// # Errors
///
/// Returns `SessionError::Empty` for an empty question list and
/// `SessionError::Validation` for the first malformed question; no partial
/// session is produced.
pub fn build_attempt<R: Rng + ?Sized>(
    questions: &[RawQuestion],
    rng: &mut R,
    started_at: DateTime<Utc>,
) -> Result<QuizSession, SessionError> {
    if questions.is_empty() {
        return Err(SessionError::Empty);
    }

    let mut order: Vec<&RawQuestion> = questions.iter().collect();
    order.shuffle(rng);

    let built = order
        .into_iter()
        .map(|raw| build_question(raw, rng))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuizSession::new(built, started_at))
}

fn build_question<R: Rng + ?Sized>(
    raw: &RawQuestion,
    rng: &mut R,
) -> Result<SessionQuestion, ValidationError> {
    let mut question = raw.canonicalize()?;
    if question.kind.shuffles_choices() {
        question.choices.shuffle(rng);
    }

    let correct_idxs = question.correct_indices();
    if correct_idxs.len() != 1 {
        return Err(ValidationError::CorrectChoiceCount {
            id: question.id,
            count: correct_idxs.len(),
        });
    }

    Ok(SessionQuestion {
        id: question.id,
        kind: question.kind,
        content: question.content,
        choices: question.choices,
        correct_idxs,
    })
}

/// Produces attempts from a fixed question set, owning the randomness and time source.
pub struct SessionBuilder {
    clock: Clock,
    rng: StdRng,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Builder with a reproducible shuffle sequence.
    #[must_use]
    pub fn seeded(clock: Clock, seed: u64) -> Self {
        Self {
            clock,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build a fresh attempt; see [`build_attempt`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the question set is empty or malformed.
    pub fn build(&mut self, questions: &[RawQuestion]) -> Result<QuizSession, SessionError> {
        let session = build_attempt(questions, &mut self.rng, self.clock.now())?;
        log::info!("new attempt with {} questions", session.len());
        Ok(session.with_clock(self.clock))
    }
}
