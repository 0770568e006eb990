//! Shared error types for the services crate.

use thiserror::Error;

use olympiad_core::model::{DraftErrors, MatchSetId, SheetError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::mock_test::Phase;

/// Errors emitted while fetching a mock test.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("mock test {0} was not found")]
    NotFound(MatchSetId),
    #[error("could not load the mock test: {0}")]
    Api(StorageError),
}

impl From<StorageError> for LoadError {
    fn from(err: StorageError) -> Self {
        Self::Api(err)
    }
}

/// Errors emitted by the mock-test state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MockTestError {
    #[error("action not allowed while the test is {0:?}")]
    WrongPhase(Phase),
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Errors emitted while submitting answers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("the test has already been submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Session(#[from] MockTestError),
    #[error("submission failed: {0}")]
    Api(#[from] StorageError),
}

impl SubmitError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => format!("Failed to submit test: {}", err.user_message()),
            other => other.to_string(),
        }
    }
}

/// Errors emitted by dashboard CRUD services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DashboardError {
    /// The signed-in role may not perform this action.
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Invalid(#[from] DraftErrors),
    #[error(transparent)]
    Api(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(String),
    #[error("could not read the file: {0}")]
    Import(String),
}

impl DashboardError {
    /// Banner text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden(message) => (*message).to_string(),
            Self::Invalid(errors) => errors.to_string(),
            Self::Api(err) => err.user_message(),
            Self::Export(_) | Self::Import(_) => self.to_string(),
        }
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&DraftErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("{0}")]
    Invalid(#[from] DraftErrors),
    #[error("Invalid credentials. Please check your email/phone and password and try again.")]
    Unauthorized,
    #[error(transparent)]
    Api(StorageError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Status {
                status: 401 | 403, ..
            } => Self::Unauthorized,
            other => Self::Api(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
