use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use olympiad_core::model::{MatchSetId, MatchSetSummary, SubmissionResult, UserId};
use storage::repository::{MatchSetRepository, ProgressRepository, SavedProgress, StorageError};
use tokio::sync::Mutex as WriteLock;
use tracing::{debug, info, warn};

use super::session::{MockTestSession, SessionEffect, SubmissionRequest};
use crate::error::{LoadError, MockTestError, SubmitError};
use crate::Clock;

/// A graded attempt, kept for the result screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAttempt {
    pub exam_id: MatchSetId,
    pub exam_title: String,
    pub student: UserId,
    pub result: SubmissionResult,
    pub time_spent_seconds: u32,
    pub automatic: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Loads mock tests, keeps their progress in local storage and submits them.
#[derive(Clone)]
pub struct MockTestService {
    clock: Clock,
    match_sets: Arc<dyn MatchSetRepository>,
    progress: Arc<dyn ProgressRepository>,
    attempts: Arc<Mutex<HashMap<MatchSetId, CompletedAttempt>>>,
    /// Serializes progress writes. Holds the exams whose attempt was graded;
    /// their progress must not be written again until they are reloaded.
    closed: Arc<WriteLock<HashSet<MatchSetId>>>,
}

impl MockTestService {
    #[must_use]
    pub fn new(
        clock: Clock,
        match_sets: Arc<dyn MatchSetRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            match_sets,
            progress,
            attempts: Arc::new(Mutex::new(HashMap::new())),
            closed: Arc::new(WriteLock::new(HashSet::new())),
        }
    }

    /// # Errors
    ///
    /// Returns `LoadError::Api` if the catalogue cannot be fetched.
    pub async fn list_match_sets(&self) -> Result<Vec<MatchSetSummary>, LoadError> {
        Ok(self.match_sets.list_match_sets().await?)
    }

    /// Fetch an exam and reapply any saved progress for it.
    ///
    /// Saved progress that does not fit the exam is discarded.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` for unknown ids, `LoadError::Api` otherwise.
    pub async fn load(
        &self,
        exam_id: MatchSetId,
        student: UserId,
    ) -> Result<MockTestSession, LoadError> {
        let exam = match self.match_sets.get_match_set(exam_id).await {
            Ok(exam) => exam,
            Err(StorageError::NotFound) => return Err(LoadError::NotFound(exam_id)),
            Err(err) => return Err(err.into()),
        };
        let mut session = MockTestSession::new(exam, student);
        self.closed.lock().await.remove(&exam_id);

        match self.progress.load_progress(exam_id).await {
            Ok(Some(saved)) => {
                if let Err(err) = session.restore(saved) {
                    warn!(%exam_id, error = %err, "discarding saved progress that does not match the exam");
                    self.discard(exam_id).await;
                } else {
                    debug!(%exam_id, "restored saved progress");
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%exam_id, error = %err, "discarding unreadable saved progress");
                self.discard(exam_id).await;
            }
        }
        Ok(session)
    }

    /// Start the clock on a loaded session.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError::WrongPhase` if the session already started.
    pub async fn start(
        &self,
        session: &mut MockTestSession,
    ) -> Result<SessionEffect, MockTestError> {
        let effect = session.start()?;
        info!(exam_id = %session.exam_id(), student = %session.student(), "mock test started");
        self.persist(session.exam_id(), &session.progress()).await;
        Ok(effect)
    }

    /// Write progress for an exam. Failures are logged and otherwise ignored.
    ///
    /// Writes for an exam that was already graded are dropped.
    pub async fn persist(&self, exam_id: MatchSetId, progress: &SavedProgress) {
        let closed = self.closed.lock().await;
        if closed.contains(&exam_id) {
            debug!(%exam_id, "skipping progress write for a submitted exam");
            return;
        }
        if let Err(err) = self.progress.save_progress(exam_id, progress).await {
            warn!(%exam_id, error = %err, "failed to save mock test progress");
        }
    }

    async fn discard(&self, exam_id: MatchSetId) {
        let _guard = self.closed.lock().await;
        self.clear(exam_id).await;
    }

    async fn close(&self, exam_id: MatchSetId) {
        let mut closed = self.closed.lock().await;
        closed.insert(exam_id);
        self.clear(exam_id).await;
    }

    async fn clear(&self, exam_id: MatchSetId) {
        if let Err(err) = self.progress.clear_progress(exam_id).await {
            warn!(%exam_id, error = %err, "failed to clear mock test progress");
        }
    }

    /// Post a frozen attempt for grading.
    ///
    /// On success the saved progress is cleared, later `persist` calls for the
    /// exam are ignored until it is loaded again, and the attempt is kept for
    /// `completed_attempt`.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Api` if the backend rejects or never receives it.
    pub async fn send(&self, request: &SubmissionRequest) -> Result<CompletedAttempt, SubmitError> {
        let result = self
            .match_sets
            .submit_answers(request.exam_id, request.student, &request.answers)
            .await
            .map_err(|err| {
                warn!(exam_id = %request.exam_id, error = %err, "mock test submission failed");
                SubmitError::Api(err)
            })?;

        info!(
            exam_id = %request.exam_id,
            answered = request.answers.len(),
            correct = result.correct_answers,
            automatic = request.automatic,
            "mock test submitted"
        );
        self.close(request.exam_id).await;

        let attempt = CompletedAttempt {
            exam_id: request.exam_id,
            exam_title: request.exam_title.clone(),
            student: request.student,
            result,
            time_spent_seconds: request.time_spent_seconds,
            automatic: request.automatic,
            submitted_at: self.clock.now(),
        };
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(attempt.exam_id, attempt.clone());
        Ok(attempt)
    }

    /// Submit a session end to end, rolling it back to in-progress on failure.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` when the session cannot be submitted or the
    /// backend call fails.
    pub async fn submit(
        &self,
        session: &mut MockTestSession,
    ) -> Result<CompletedAttempt, SubmitError> {
        let request = session.begin_submit()?;
        match self.send(&request).await {
            Ok(attempt) => {
                session.complete_submit(attempt.result.clone())?;
                Ok(attempt)
            }
            Err(err) => {
                session.fail_submit(err.user_message());
                Err(err)
            }
        }
    }

    /// The last graded attempt for an exam in this run of the app.
    #[must_use]
    pub fn completed_attempt(&self, exam_id: MatchSetId) -> Option<CompletedAttempt> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&exam_id)
            .cloned()
    }
}
