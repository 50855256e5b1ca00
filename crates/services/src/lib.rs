#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{InputError, NavigationError, SessionError};

pub use sessions::{
    ChoiceMark, ChoiceView, Feedback, NavState, PrimaryAction, QuestionView, QuizPlayer,
    QuizSession, ReviewChoice, ReviewItem, ReviewStatus, SessionBuilder, SessionIntent,
    SessionProgress, SessionQuestion, SessionReport, Transition,
};
