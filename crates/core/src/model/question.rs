use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Line prefix marking a correct choice.
pub const CORRECT_MARKER: &str = "#$";
/// Line prefix marking a wrong choice.
pub const WRONG_MARKER: &str = "##";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("question id={id}: type must be 'multi' or 'truefalse' (found '{found}')")]
    InvalidType { id: QuestionId, found: String },

    #[error("question id={id}: missing '{field}'")]
    MissingField { id: QuestionId, field: &'static str },

    #[error("question id={id}: choices are empty or not in ##/#$ format")]
    NoChoices { id: QuestionId },

    #[error("question id={id}: truefalse must have exactly 2 choices (found {count})")]
    TrueFalseChoiceCount { id: QuestionId, count: usize },

    #[error("question id={id}: a question must have exactly one correct choice (found {count})")]
    CorrectChoiceCount { id: QuestionId, count: usize },
}

impl ValidationError {
    /// The question that failed validation.
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        match self {
            ValidationError::InvalidType { id, .. }
            | ValidationError::MissingField { id, .. }
            | ValidationError::NoChoices { id }
            | ValidationError::TrueFalseChoiceCount { id, .. }
            | ValidationError::CorrectChoiceCount { id, .. } => id,
        }
    }
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// A/B/C/D style; choices are shuffled per attempt.
    Multi,
    /// Exactly two choices kept in manifest order.
    TrueFalse,
}

impl QuestionKind {
    /// Short badge shown next to the question.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::Multi => "A/B/C/D",
            QuestionKind::TrueFalse => "TRUE/FALSE",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Multi => "multi",
            QuestionKind::TrueFalse => "truefalse",
        }
    }

    #[must_use]
    pub fn shuffles_choices(self) -> bool {
        matches!(self, QuestionKind::Multi)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type string is not a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question type '{}'", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for QuestionKind {
    type Err = ParseKindError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multi" => Ok(QuestionKind::Multi),
            "truefalse" => Ok(QuestionKind::TrueFalse),
            _ => Err(ParseKindError(s.to_owned())),
        }
    }
}

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub correct: bool,
}

impl Choice {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// Parse a choice block: one choice per line, `#$` for correct, `##` for wrong.
///
/// Lines are trimmed, blank lines dropped, and lines with neither marker ignored.
/// Surviving lines keep their order.
#[must_use]
pub fn parse_choices(block: &str) -> Vec<Choice> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix(CORRECT_MARKER) {
                Some(Choice::new(rest.trim(), true))
            } else {
                line.strip_prefix(WRONG_MARKER)
                    .map(|rest| Choice::new(rest.trim(), false))
            }
        })
        .collect()
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// A normalized manifest record whose choice block has not been parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestion {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub content: String,
    pub choices_text: String,
}

impl RawQuestion {
    /// Parse the choice block and apply the per-kind choice-count rules.
    ///
    /// The single-correct-choice rule is checked by the session builder
    /// once the final order is known.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoChoices` when no line carries a marker.
    /// Returns `ValidationError::TrueFalseChoiceCount` for a truefalse question
    /// without exactly two choices.
    pub fn canonicalize(&self) -> Result<CanonicalQuestion, ValidationError> {
        let choices = parse_choices(&self.choices_text);
        if choices.is_empty() {
            return Err(ValidationError::NoChoices {
                id: self.id.clone(),
            });
        }
        if self.kind == QuestionKind::TrueFalse && choices.len() != 2 {
            return Err(ValidationError::TrueFalseChoiceCount {
                id: self.id.clone(),
                count: choices.len(),
            });
        }

        Ok(CanonicalQuestion {
            id: self.id.clone(),
            kind: self.kind,
            content: self.content.clone(),
            choices,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuestion {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub content: String,
    pub choices: Vec<Choice>,
}

impl CanonicalQuestion {
    /// Indices of choices flagged correct, in current order.
    #[must_use]
    pub fn correct_indices(&self) -> Vec<usize> {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.correct.then_some(idx))
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
