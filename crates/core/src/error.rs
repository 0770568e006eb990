use thiserror::Error;

use crate::model::{DraftErrors, ExamError, RoleError, SheetError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Draft(#[from] DraftErrors),
}
