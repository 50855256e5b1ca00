mod grading;
mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use grading::{ChoiceMark, choice_marks};
pub use plan::{SessionBuilder, SessionQuestion, build_attempt};
pub use progress::SessionProgress;
pub use service::{NavState, QuizSession, SessionIntent, Transition};
pub use view::{
    ChoiceView, Feedback, PrimaryAction, QuestionView, ReviewChoice, ReviewItem, ReviewStatus,
    SessionReport,
};
pub use workflow::QuizPlayer;
