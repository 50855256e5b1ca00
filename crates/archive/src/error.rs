use thiserror::Error;

/// Errors surfaced while fetching or opening a question archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("cannot open archive: {0}")]
    Open(#[from] zip::result::ZipError),

    #[error("questions.yaml (or questions.yml) not found in archive")]
    MissingManifest,

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("invalid archive source: {0}")]
    InvalidSource(String),

    #[error("archive request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("archive decoding task failed: {0}")]
    Task(String),
}

impl From<serde_yaml::Error> for ArchiveError {
    fn from(err: serde_yaml::Error) -> Self {
        ArchiveError::InvalidManifest(err.to_string())
    }
}
