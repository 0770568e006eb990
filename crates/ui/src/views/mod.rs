mod blog_reader;
mod blogs;
mod dashboards;
mod exams;
mod form;
mod home;
mod login;
pub(crate) mod mock_test;
mod nav;
mod question_bank;
mod register;
mod results;
mod sales_team;
mod schools;
mod state;
mod tasks;
mod users;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use blog_reader::{BlogListView, BlogPostView};
pub use blogs::BlogsView;
pub use dashboards::{AdminDashboard, SalesDashboard, SchoolDashboard, StudentDashboard};
pub use exams::ExamsView;
pub use home::HomeView;
pub use login::LoginView;
pub use mock_test::{MockTestListView, MockTestResultView, MockTestView};
pub use nav::NavBar;
pub use question_bank::MockTestAdminView;
pub use register::RegisterView;
pub use results::ResultsView;
pub use sales_team::SalesTeamView;
pub use schools::SchoolsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use tasks::TasksView;
pub use users::UsersView;
