#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod dashboards;
pub mod error;
pub mod mock_test;

pub use olympiad_core::Clock;

pub use app_services::AppServices;
pub use auth::AuthService;
pub use dashboards::{
    BlogService, ExamService, FetchTicket, Keyed, ListState, MockTestAdminService,
    QUESTION_TEMPLATE_CSV, QUESTION_TEMPLATE_FILE_NAME, QuestionImport, ResultService,
    SalesTeamService, SchoolService, SkippedRow, TaskService, USER_CSV_FILE_NAME, UserService,
};
pub use error::{AppServicesError, AuthError, DashboardError, LoadError, MockTestError, SubmitError};
pub use mock_test::{
    CompletedAttempt, MockTestService, MockTestSession, Phase, SessionEffect, SubmissionRequest,
    SubmitSummary, TickOutcome,
};
