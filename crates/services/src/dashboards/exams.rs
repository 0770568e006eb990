use std::sync::Arc;

use olympiad_core::model::{
    Capability, SessionUser, UpcomingExam, UpcomingExamDraft, UpcomingExamId,
};
use storage::repository::UpcomingExamRepository;
use tracing::info;

use super::authorize;
use crate::error::DashboardError;

/// The upcoming-exams board admins maintain.
#[derive(Clone)]
pub struct ExamService {
    exams: Arc<dyn UpcomingExamRepository>,
}

impl ExamService {
    #[must_use]
    pub fn new(exams: Arc<dyn UpcomingExamRepository>) -> Self {
        Self { exams }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<UpcomingExam>, DashboardError> {
        authorize(viewer, Capability::ManageExams, "Only admins can manage exams")?;
        Ok(self.exams.list_exams().await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn create(
        &self,
        viewer: &SessionUser,
        draft: UpcomingExamDraft,
    ) -> Result<UpcomingExam, DashboardError> {
        authorize(viewer, Capability::ManageExams, "Only admins can add exams")?;
        let valid = draft.validate()?;
        let exam = self.exams.create_exam(&valid).await?;
        info!(exam_id = %exam.id, "upcoming exam added");
        Ok(exam)
    }

    /// # Errors
    ///
    /// Same as `create`.
    pub async fn update(
        &self,
        viewer: &SessionUser,
        id: &UpcomingExamId,
        draft: UpcomingExamDraft,
    ) -> Result<UpcomingExam, DashboardError> {
        authorize(viewer, Capability::ManageExams, "Only admins can edit exams")?;
        let valid = draft.validate()?;
        Ok(self.exams.update_exam(id, &valid).await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn remove(
        &self,
        viewer: &SessionUser,
        id: &UpcomingExamId,
    ) -> Result<(), DashboardError> {
        authorize(viewer, Capability::ManageExams, "Only admins can delete exams")?;
        self.exams.delete_exam(id).await?;
        info!(exam_id = %id, "upcoming exam deleted");
        Ok(())
    }

    /// Flip the recommended flag and return the row as it now stands.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn toggle_recommended(
        &self,
        viewer: &SessionUser,
        exam: &UpcomingExam,
    ) -> Result<UpcomingExam, DashboardError> {
        authorize(viewer, Capability::ManageExams, "Only admins can recommend exams")?;
        self.exams.toggle_recommended(&exam.id).await?;
        let toggled = exam.toggled();
        info!(exam_id = %toggled.id, recommended = toggled.recommended, "exam recommendation changed");
        Ok(toggled)
    }
}
