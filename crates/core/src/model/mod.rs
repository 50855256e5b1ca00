mod answer;
mod ids;
mod question;

pub use answer::AnswerState;
pub use ids::QuestionId;
pub use question::{
    CORRECT_MARKER, CanonicalQuestion, Choice, ParseKindError, QuestionKind, RawQuestion,
    ValidationError, WRONG_MARKER, parse_choices,
};
