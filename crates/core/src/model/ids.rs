use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a question as written in the manifest.
///
/// Manifests may use numbers or strings, so the id keeps its textual form.
/// Questions without an id get their 1-based position.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id assigned to the question at `index` (0-based) when the source has none.
    #[must_use]
    pub fn from_position(index: usize) -> Self {
        Self((index + 1).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
