use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ArchiveError;
use crate::reader::{LoadedArchive, read_archive};

/// Where an archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    Path(PathBuf),
    Url(Url),
}

impl ArchiveSource {
    /// Classify `raw` as an `http(s)` URL or a local path.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::InvalidSource` for blank input or a malformed URL.
    pub fn parse(raw: &str) -> Result<Self, ArchiveError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ArchiveError::InvalidSource("empty archive location".into()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw)
                .map_err(|err| ArchiveError::InvalidSource(format!("{raw}: {err}")))?;
            return Ok(ArchiveSource::Url(url));
        }

        Ok(ArchiveSource::Path(PathBuf::from(raw)))
    }
}

impl FromStr for ArchiveSource {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveSource::Path(path) => write!(f, "{}", path.display()),
            ArchiveSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Retrieves raw archive bytes.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    async fn fetch(&self, source: &ArchiveSource) -> Result<Vec<u8>, ArchiveError>;
}

/// Reads local files with `tokio::fs` and URLs with `reqwest`.
#[derive(Clone, Default)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ArchiveFetcher for SourceFetcher {
    async fn fetch(&self, source: &ArchiveSource) -> Result<Vec<u8>, ArchiveError> {
        match source {
            ArchiveSource::Path(path) => Ok(tokio::fs::read(path).await?),
            ArchiveSource::Url(url) => {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ArchiveError::HttpStatus(status));
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Fetch and decode an archive. Decoding runs on the blocking pool.
///
/// # Errors
///
/// Propagates fetch failures and any `read_archive` error.
pub async fn load_archive(
    fetcher: &dyn ArchiveFetcher,
    source: &ArchiveSource,
) -> Result<LoadedArchive, ArchiveError> {
    log::info!("loading archive from {source}");
    let bytes = fetcher.fetch(source).await?;
    tokio::task::spawn_blocking(move || read_archive(&bytes))
        .await
        .map_err(|err| ArchiveError::Task(err.to_string()))?
}
