use std::sync::Arc;

use storage::http::ApiConfig;
use storage::repository::Storage;

use crate::auth::AuthService;
use crate::dashboards::{
    BlogService, ExamService, MockTestAdminService, ResultService, SalesTeamService, SchoolService,
    TaskService, UserService,
};
use crate::error::AppServicesError;
use crate::mock_test::MockTestService;
use crate::Clock;

/// Assembles the app-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthService>,
    mock_tests: Arc<MockTestService>,
    mock_test_admin: Arc<MockTestAdminService>,
    exams: Arc<ExamService>,
    tasks: Arc<TaskService>,
    schools: Arc<SchoolService>,
    sales_team: Arc<SalesTeamService>,
    users: Arc<UserService>,
    blogs: Arc<BlogService>,
    results: Arc<ResultService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                Arc::clone(&storage.auth),
                Arc::clone(&storage.session_record),
            )),
            mock_tests: Arc::new(MockTestService::new(
                clock,
                Arc::clone(&storage.match_sets),
                Arc::clone(&storage.progress),
            )),
            mock_test_admin: Arc::new(MockTestAdminService::new(Arc::clone(&storage.match_sets))),
            exams: Arc::new(ExamService::new(Arc::clone(&storage.exams))),
            tasks: Arc::new(TaskService::new(clock, Arc::clone(&storage.tasks))),
            schools: Arc::new(SchoolService::new(Arc::clone(&storage.schools))),
            sales_team: Arc::new(SalesTeamService::new(Arc::clone(&storage.sales))),
            users: Arc::new(UserService::new(Arc::clone(&storage.users))),
            blogs: Arc::new(BlogService::new(Arc::clone(&storage.blogs))),
            results: Arc::new(ResultService::new(Arc::clone(&storage.results))),
        }
    }

    /// Build services over the HTTP API with `SQLite` local persistence.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the local database cannot be opened or migrated.
    pub async fn connect(
        api: ApiConfig,
        db_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::connect(api, db_url).await?;
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn mock_tests(&self) -> Arc<MockTestService> {
        Arc::clone(&self.mock_tests)
    }

    #[must_use]
    pub fn mock_test_admin(&self) -> Arc<MockTestAdminService> {
        Arc::clone(&self.mock_test_admin)
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn tasks(&self) -> Arc<TaskService> {
        Arc::clone(&self.tasks)
    }

    #[must_use]
    pub fn schools(&self) -> Arc<SchoolService> {
        Arc::clone(&self.schools)
    }

    #[must_use]
    pub fn sales_team(&self) -> Arc<SalesTeamService> {
        Arc::clone(&self.sales_team)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn blogs(&self) -> Arc<BlogService> {
        Arc::clone(&self.blogs)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultService> {
        Arc::clone(&self.results)
    }
}
