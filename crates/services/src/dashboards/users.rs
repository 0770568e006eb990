use std::sync::Arc;

use olympiad_core::model::{
    Capability, NewUserDraft, RegistrationDraft, SessionUser, UserAccount, UserId, UserUpdate,
};
use storage::repository::UserRepository;
use tracing::info;

use super::authorize;
use crate::error::DashboardError;

/// Download name for `UserService::export_csv`.
pub const USER_CSV_FILE_NAME: &str = "users.csv";

const CSV_HEADER: [&str; 7] = [
    "User ID",
    "Name",
    "Email",
    "Phone",
    "School",
    "Class",
    "Registered Exams",
];

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<UserAccount>, DashboardError> {
        authorize(viewer, Capability::ViewUsers, "You do not have access to users")?;
        Ok(self.users.list_users().await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn create(
        &self,
        viewer: &SessionUser,
        draft: NewUserDraft,
    ) -> Result<UserAccount, DashboardError> {
        authorize(viewer, Capability::AddUsers, "Only admins can add users")?;
        let valid = draft.validate()?;
        let user = self.users.create_user(&valid).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Public sign-up; no session required.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` or `DashboardError::Api`.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<UserAccount, DashboardError> {
        let valid = draft.validate()?;
        let user = self.users.create_user(&valid).await?;
        info!(user_id = %user.id, "student registered");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn update(
        &self,
        viewer: &SessionUser,
        id: UserId,
        update: UserUpdate,
    ) -> Result<UserAccount, DashboardError> {
        authorize(viewer, Capability::EditUsers, "You are not allowed to edit users")?;
        let update = update.validate()?;
        Ok(self.users.update_user(id, &update).await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn remove(&self, viewer: &SessionUser, id: UserId) -> Result<(), DashboardError> {
        authorize(viewer, Capability::DeleteUsers, "Only admins can delete users")?;
        self.users.delete_user(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Render the given rows as CSV, header first.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Export` if the writer fails.
    pub fn export_csv<'a>(
        users: impl IntoIterator<Item = &'a UserAccount>,
    ) -> Result<String, DashboardError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(export_error)?;
        for user in users {
            writer
                .write_record([
                    user.user_code.as_str(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.phone.as_deref().unwrap_or(""),
                    user.school.as_deref().unwrap_or(""),
                    user.user_class.as_deref().unwrap_or(""),
                    &user.registered_exams.len().to_string(),
                ])
                .map_err(export_error)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| export_error(err.error()))?;
        String::from_utf8(bytes).map_err(export_error)
    }
}

fn export_error(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Export(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympiad_core::model::RegisteredExam;

    fn account(name: &str, school: Option<&str>) -> UserAccount {
        UserAccount {
            id: UserId::new(4),
            user_code: "STU004".into(),
            name: name.into(),
            email: "a@b.co".into(),
            phone: None,
            school: school.map(str::to_string),
            user_class: Some("8".into()),
            registered_exams: vec![RegisteredExam {
                title: "Maths".into(),
                subject: "Maths".into(),
                date: None,
            }],
        }
    }

    #[test]
    fn csv_has_header_and_exam_count() {
        let users = [account("Asha", Some("Green Valley"))];
        let csv = UserService::export_csv(&users).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("User ID,Name,Email,Phone,School,Class,Registered Exams")
        );
        assert_eq!(lines.next(), Some("STU004,Asha,a@b.co,,Green Valley,8,1"));
    }

    #[test]
    fn csv_quotes_commas_and_quotes() {
        let users = [account("Rao, \"Bunty\"", None)];
        let csv = UserService::export_csv(&users).unwrap();
        assert!(csv.contains("\"Rao, \"\"Bunty\"\"\""));
    }
}
