use std::sync::Arc;

use olympiad_core::model::{Capability, ExamResult, ResultStats, SessionUser};
use storage::repository::ExamResultRepository;

use super::authorize;
use crate::error::DashboardError;

/// A student's own exam history.
#[derive(Clone)]
pub struct ResultService {
    results: Arc<dyn ExamResultRepository>,
}

impl ResultService {
    #[must_use]
    pub fn new(results: Arc<dyn ExamResultRepository>) -> Self {
        Self { results }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` for non-students or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<ExamResult>, DashboardError> {
        authorize(
            viewer,
            Capability::ViewOwnResults,
            "Only students have exam results",
        )?;
        Ok(self.results.results_for_user(viewer.id()).await?)
    }

    #[must_use]
    pub fn stats(results: &[ExamResult]) -> ResultStats {
        ResultStats::from_results(results)
    }
}
