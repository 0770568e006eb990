use std::sync::Arc;

use olympiad_core::model::{Capability, School, SchoolDraft, SchoolId, SessionUser};
use storage::repository::SchoolRepository;
use tracing::info;

use super::authorize;
use crate::error::DashboardError;

/// School registrations for admin and sales dashboards.
#[derive(Clone)]
pub struct SchoolService {
    schools: Arc<dyn SchoolRepository>,
}

impl SchoolService {
    #[must_use]
    pub fn new(schools: Arc<dyn SchoolRepository>) -> Self {
        Self { schools }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` for roles without school access, or
    /// `DashboardError::Api` on request failure.
    pub async fn list(
        &self,
        viewer: &SessionUser,
        active_only: bool,
    ) -> Result<Vec<School>, DashboardError> {
        authorize(viewer, Capability::ViewSchools, "You do not have access to schools")?;
        Ok(self.schools.list_schools(active_only).await?)
    }

    /// Active schools for the public sign-up picker.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Api` on request failure.
    pub async fn active_directory(&self) -> Result<Vec<School>, DashboardError> {
        Ok(self.schools.list_schools(true).await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` with every field message, or the
    /// role and request errors of `list`.
    pub async fn create(
        &self,
        viewer: &SessionUser,
        draft: SchoolDraft,
    ) -> Result<School, DashboardError> {
        authorize(
            viewer,
            Capability::ManageSchools,
            "Only admin or sales users can add schools",
        )?;
        let valid = draft.validate()?;
        let school = self.schools.create_school(&valid).await?;
        info!(school_id = %school.id, by = %viewer.role(), "school registered");
        Ok(school)
    }

    /// # Errors
    ///
    /// Same as `create`.
    pub async fn update(
        &self,
        viewer: &SessionUser,
        id: &SchoolId,
        draft: SchoolDraft,
    ) -> Result<School, DashboardError> {
        authorize(
            viewer,
            Capability::ManageSchools,
            "Only admin or sales users can edit schools",
        )?;
        let valid = draft.validate()?;
        Ok(self.schools.update_school(id, &valid).await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn toggle_status(
        &self,
        viewer: &SessionUser,
        id: &SchoolId,
    ) -> Result<School, DashboardError> {
        authorize(
            viewer,
            Capability::ManageSchools,
            "Only admin or sales users can change school status",
        )?;
        let school = self.schools.toggle_school_status(id).await?;
        info!(school_id = %school.id, status = %school.status, "school status changed");
        Ok(school)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn remove(&self, viewer: &SessionUser, id: &SchoolId) -> Result<(), DashboardError> {
        authorize(viewer, Capability::DeleteSchools, "Only admins can delete schools")?;
        self.schools.delete_school(id).await?;
        info!(school_id = %id, "school deleted");
        Ok(())
    }
}
