//! Question Normalizer: turns manifest records into validated `RawQuestion`s.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{QuestionId, QuestionKind, RawQuestion, ValidationError};

/// A scalar manifest value; non-text scalars are coerced to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// `false`, `0`, `NaN` and empty text count as absent.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n != 0,
            Scalar::Float(f) => *f != 0.0 && !f.is_nan(),
            Scalar::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

/// One question record as it appears in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuestionSource {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default, rename = "type")]
    pub kind: Option<Scalar>,
    #[serde(default)]
    pub content: Option<Scalar>,
    #[serde(default)]
    pub choices: Option<Scalar>,
}

impl RawQuestionSource {
    /// Convenience constructor for text-only records.
    #[must_use]
    pub fn text(kind: &str, content: &str, choices: &str) -> Self {
        Self {
            id: None,
            kind: Some(kind.into()),
            content: Some(content.into()),
            choices: Some(choices.into()),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<Scalar>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

fn present_text(value: Option<&Scalar>) -> Option<String> {
    value
        .filter(|v| v.is_present())
        .map(ToString::to_string)
        .filter(|s| !s.is_empty())
}

/// Validate manifest records, assigning 1-based ids where missing.
///
/// Fails fast on the first invalid record; nothing is returned for the others.
///
/// # Errors
///
/// Returns `ValidationError::InvalidType` for a missing or unknown `type`.
/// Returns `ValidationError::MissingField` for empty `content` or `choices`.
pub fn normalize(sources: &[RawQuestionSource]) -> Result<Vec<RawQuestion>, ValidationError> {
    sources
        .iter()
        .enumerate()
        .map(|(idx, source)| normalize_one(idx, source))
        .collect()
}

fn normalize_one(idx: usize, source: &RawQuestionSource) -> Result<RawQuestion, ValidationError> {
    let id = source
        .id
        .as_ref()
        .filter(|v| v.is_present())
        .map_or_else(|| QuestionId::from_position(idx), |v| QuestionId::new(v.to_string()));

    let raw_kind = source
        .kind
        .as_ref()
        .filter(|v| v.is_present())
        .map(ToString::to_string)
        .unwrap_or_default();
    let kind = raw_kind
        .parse::<QuestionKind>()
        .map_err(|_| ValidationError::InvalidType {
            id: id.clone(),
            found: raw_kind.clone(),
        })?;

    let content = present_text(source.content.as_ref()).ok_or_else(|| {
        ValidationError::MissingField {
            id: id.clone(),
            field: "content",
        }
    })?;
    let choices_text = present_text(source.choices.as_ref()).ok_or_else(|| {
        ValidationError::MissingField {
            id: id.clone(),
            field: "choices",
        }
    })?;

    Ok(RawQuestion {
        id,
        kind,
        content,
        choices_text,
    })
}
