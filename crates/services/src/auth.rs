use std::sync::Arc;

use olympiad_core::model::{Credentials, LoginIdentifier, Persistence, SessionUser};
use storage::repository::{AuthRepository, SessionRecord, SessionRecordRepository};
use tracing::{info, warn};

use crate::error::AuthError;

/// Login, logout and the remembered session record.
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthRepository>,
    records: Arc<dyn SessionRecordRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthRepository>, records: Arc<dyn SessionRecordRepository>) -> Self {
        Self { auth, records }
    }

    /// Validate the form, call the backend and store the record when asked to
    /// remember the login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` for a malformed form, `AuthError::Unauthorized`
    /// for rejected credentials, or `AuthError::Api`.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        persistence: Persistence,
    ) -> Result<SessionUser, AuthError> {
        let credentials = Credentials::parse(identifier, password)?;
        let via = match credentials.identifier() {
            LoginIdentifier::Email(_) => "email",
            LoginIdentifier::Phone(_) => "phone",
        };
        let user = self.auth.login(&credentials).await.inspect_err(|err| {
            warn!(via, error = %err, "login failed");
        })?;

        match persistence {
            Persistence::Remember => {
                if let Err(err) = self.records.save_user(&SessionRecord::from_user(&user)).await {
                    warn!(error = %err, "failed to remember login");
                }
            }
            Persistence::Session => self.forget().await,
        }
        info!(user_id = %user.id(), role = %user.role(), via, "logged in");
        Ok(user)
    }

    /// The remembered login, if any. An unreadable record is cleared.
    pub async fn restore(&self) -> Option<SessionUser> {
        let record = match self.records.load_user().await {
            Ok(record) => record?,
            Err(err) => {
                warn!(error = %err, "discarding unreadable session record");
                self.forget().await;
                return None;
            }
        };
        match record.into_user() {
            Ok(user) => {
                info!(user_id = %user.id(), role = %user.role(), "session restored");
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "discarding session record with unknown role");
                self.forget().await;
                None
            }
        }
    }

    pub async fn logout(&self, user: &SessionUser) {
        self.forget().await;
        info!(user_id = %user.id(), "logged out");
    }

    async fn forget(&self) {
        if let Err(err) = self.records.clear_user().await {
            warn!(error = %err, "failed to clear session record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympiad_core::model::{Role, UserId};
    use storage::repository::{InMemoryRepository, KeyValueStore, SESSION_USER_KEY};

    fn service() -> (AuthService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        repo.insert_account(
            SessionUser::new(UserId::new(7), "Meera", "meera@school.in", Role::School),
            Some("9876543210"),
            "secret1",
        )
        .unwrap();
        let shared = Arc::new(repo.clone());
        (AuthService::new(shared.clone(), shared), repo)
    }

    #[tokio::test]
    async fn remember_me_survives_restore() {
        let (auth, _) = service();
        let user = auth
            .login("9876543210", "secret1", Persistence::Remember)
            .await
            .unwrap();
        assert_eq!(user.role(), Role::School);
        assert_eq!(auth.restore().await, Some(user.clone()));
        auth.logout(&user).await;
        assert_eq!(auth.restore().await, None);
    }

    #[tokio::test]
    async fn session_only_login_is_not_remembered() {
        let (auth, _) = service();
        auth.login("meera@school.in", "secret1", Persistence::Session)
            .await
            .unwrap();
        assert_eq!(auth.restore().await, None);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (auth, _) = service();
        let err = auth
            .login("meera@school.in", "nope", Persistence::Session)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthorized);
    }

    #[tokio::test]
    async fn malformed_form_never_reaches_backend() {
        let (auth, repo) = service();
        repo.set_offline(true);
        let err = auth.login("12345", "", Persistence::Session).await.unwrap_err();
        let AuthError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn corrupt_record_is_cleared() {
        let (auth, repo) = service();
        repo.set_value(SESSION_USER_KEY, "{not json").await.unwrap();
        assert_eq!(auth.restore().await, None);
        assert_eq!(repo.get_value(SESSION_USER_KEY).await.unwrap(), None);
    }
}
