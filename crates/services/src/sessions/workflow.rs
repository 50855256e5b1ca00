use std::sync::Arc;

use archive::{ArchiveFetcher, ArchiveSource, AssetStore, LoadedArchive, SourceFetcher};
use quiz_core::Clock;
use quiz_core::model::RawQuestion;
use quiz_core::normalize;

use super::plan::SessionBuilder;
use super::service::QuizSession;
use super::view::{QuestionView, SessionReport};
use crate::error::SessionError;

/// Everything derived from one successfully loaded archive.
struct LoadedQuiz {
    assets: AssetStore,
    questions: Vec<RawQuestion>,
    session: QuizSession,
}

/// Owns the loaded archive, its normalized questions and the active attempt.
///
/// Replacing or discarding the archive releases its assets first.
pub struct QuizPlayer {
    fetcher: Arc<dyn ArchiveFetcher>,
    builder: SessionBuilder,
    loaded: Option<LoadedQuiz>,
}

impl QuizPlayer {
    #[must_use]
    pub fn new(clock: Clock, fetcher: Arc<dyn ArchiveFetcher>) -> Self {
        Self::with_builder(SessionBuilder::new(clock), fetcher)
    }

    #[must_use]
    pub fn with_builder(builder: SessionBuilder, fetcher: Arc<dyn ArchiveFetcher>) -> Self {
        Self {
            fetcher,
            builder,
            loaded: None,
        }
    }

    /// Player reading local files and `http(s)` URLs.
    #[must_use]
    pub fn with_default_fetcher(clock: Clock) -> Self {
        Self::new(clock, Arc::new(SourceFetcher::new()))
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Fetch, decode and start an attempt on a new archive.
    ///
    /// The previous archive is torn down before fetching. On failure the
    /// player stays unloaded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Archive` for fetch/decode failures and
    /// `SessionError::Validation` or `SessionError::Empty` for bad question data.
    pub async fn load(&mut self, source: &ArchiveSource) -> Result<&mut QuizSession, SessionError> {
        self.reset_to_pick();
        let archive = archive::load_archive(self.fetcher.as_ref(), source)
            .await
            .inspect_err(|err| log::warn!("archive load failed: {err}"))?;
        self.install(archive)
    }

    /// Like [`QuizPlayer::load`] for archive bytes already in memory.
    ///
    /// # Errors
    ///
    /// Same as [`QuizPlayer::load`].
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&mut QuizSession, SessionError> {
        self.reset_to_pick();
        let archive = archive::read_archive(bytes)
            .inspect_err(|err| log::warn!("archive load failed: {err}"))?;
        self.install(archive)
    }

    fn install(&mut self, archive: LoadedArchive) -> Result<&mut QuizSession, SessionError> {
        let LoadedArchive { questions, assets } = archive;
        let questions = normalize(&questions)
            .inspect_err(|err| log::warn!("rejected question set: {err}"))?;
        let session = self
            .builder
            .build(&questions)
            .inspect_err(|err| log::warn!("rejected question set: {err}"))?;

        let loaded = self.loaded.insert(LoadedQuiz {
            assets,
            questions,
            session,
        });
        Ok(&mut loaded.session)
    }

    /// Start a fresh attempt on the same questions, from any state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` without an archive.
    pub fn retry(&mut self) -> Result<&mut QuizSession, SessionError> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.session = self.builder.build(&loaded.questions)?;
        Ok(&mut loaded.session)
    }

    /// Drop the session and release the archive's assets.
    pub fn reset_to_pick(&mut self) {
        if let Some(mut loaded) = self.loaded.take() {
            let released = loaded.assets.release();
            log::info!("question set unloaded ({released} assets released)");
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` without an archive.
    pub fn session_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        self.loaded
            .as_mut()
            .map(|l| &mut l.session)
            .ok_or(SessionError::NotLoaded)
    }

    #[must_use]
    pub fn assets(&self) -> Option<&AssetStore> {
        self.loaded.as_ref().map(|l| &l.assets)
    }

    #[must_use]
    pub fn questions(&self) -> &[RawQuestion] {
        self.loaded
            .as_ref()
            .map(|l| l.questions.as_slice())
            .unwrap_or(&[])
    }

    /// View of the question under the cursor.
    #[must_use]
    pub fn current_view(&self) -> Option<QuestionView> {
        let loaded = self.loaded.as_ref()?;
        QuestionView::build(
            &loaded.session,
            loaded.session.current_index(),
            &loaded.assets,
        )
    }

    /// Review of the active attempt, available in any state.
    #[must_use]
    pub fn report(&self) -> Option<SessionReport> {
        let loaded = self.loaded.as_ref()?;
        Some(SessionReport::from_session(&loaded.session, &loaded.assets))
    }
}
