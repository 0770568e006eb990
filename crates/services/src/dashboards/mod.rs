//! Role-checked CRUD services behind the dashboard tables.

mod blogs;
mod exams;
mod list_state;
mod question_bank;
mod results;
mod sales;
mod schools;
mod tasks;
mod users;

use olympiad_core::model::{Capability, SessionUser};

use crate::error::DashboardError;

pub use blogs::BlogService;
pub use exams::ExamService;
pub use list_state::{FetchTicket, Keyed, ListState};
pub use question_bank::{
    MockTestAdminService, QUESTION_TEMPLATE_CSV, QUESTION_TEMPLATE_FILE_NAME, QuestionImport,
    SkippedRow,
};
pub use results::ResultService;
pub use sales::SalesTeamService;
pub use schools::SchoolService;
pub use tasks::TaskService;
pub use users::{USER_CSV_FILE_NAME, UserService};

fn authorize(
    viewer: &SessionUser,
    capability: Capability,
    message: &'static str,
) -> Result<(), DashboardError> {
    if viewer.allows(capability) {
        Ok(())
    } else {
        Err(DashboardError::Forbidden(message))
    }
}
