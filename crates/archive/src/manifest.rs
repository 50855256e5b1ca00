use quiz_core::normalize::RawQuestionSource;
use serde_yaml::Value;

use crate::error::ArchiveError;

/// Entry names searched for the manifest, in order.
pub const MANIFEST_NAMES: [&str; 2] = ["questions.yaml", "questions.yml"];

/// True for entries that are manifests rather than assets.
#[must_use]
pub fn is_manifest_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

/// Parse manifest text: a mapping whose `questions` key holds a list.
///
/// # Errors
///
/// Returns `ArchiveError::InvalidManifest` if the YAML is malformed, the
/// `questions` list is missing, or a record is not a mapping of scalars.
pub fn parse_manifest(text: &str) -> Result<Vec<RawQuestionSource>, ArchiveError> {
    let doc: Value = serde_yaml::from_str(text)?;
    let Some(questions) = doc.get("questions").filter(|v| v.is_sequence()) else {
        return Err(ArchiveError::InvalidManifest(
            "expected a 'questions:' key holding a list".into(),
        ));
    };
    Ok(serde_yaml::from_value(questions.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::normalize::Scalar;

    #[test]
    fn parses_records_with_mixed_scalars() {
        let yaml = r"
questions:
  - id: 7
    type: multi
    content: Capital of France?
    choices: |
      #$ Paris
      ## Rome
  - type: TRUEFALSE
    content: 42
    choices: |
      #$ Yes
      ## No
";
        let records = parse_manifest(yaml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(Scalar::Int(7)));
        assert_eq!(records[1].id, None);
        assert_eq!(records[1].content, Some(Scalar::Int(42)));
        assert_eq!(
            records[0].choices,
            Some(Scalar::Text("#$ Paris\n## Rome\n".into()))
        );
    }

    #[test]
    fn rejects_missing_questions_list() {
        let err = parse_manifest("title: quiz\n").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidManifest(_)));

        let err = parse_manifest("questions: nope\n").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidManifest(_)));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_manifest("questions: [unclosed").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidManifest(_)));
    }

    #[test]
    fn manifest_names_are_case_insensitive() {
        assert!(is_manifest_name("extra/Notes.YML"));
        assert!(is_manifest_name("questions.yaml"));
        assert!(!is_manifest_name("img/diagram.png"));
    }
}
