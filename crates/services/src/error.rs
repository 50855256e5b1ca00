//! Shared error types for the services crate.

use thiserror::Error;

use archive::ArchiveError;
use quiz_core::model::ValidationError;

use crate::sessions::NavState;

/// Recoverable user-input problems; the session is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputError {
    #[error("no answer selected")]
    NoSelection,
    #[error("choice {choice} does not exist (question has {available} choices)")]
    ChoiceOutOfRange { choice: usize, available: usize },
    #[error("question {index} does not exist (session has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
}

/// A navigation action that the current state does not permit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct NavigationError {
    pub action: &'static str,
    pub state: NavState,
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("no question archive is loaded")]
    NotLoaded,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
