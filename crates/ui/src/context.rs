use std::sync::Arc;

use dioxus::prelude::*;
use olympiad_core::model::{Role, SessionUser};
use services::{
    AppServices, AuthService, BlogService, ExamService, MockTestAdminService, MockTestService,
    ResultService, SalesTeamService, SchoolService, TaskService, UserService,
};

/// What the views need from the composition root.
pub trait UiApp: Send + Sync {
    fn auth(&self) -> Arc<AuthService>;
    fn mock_tests(&self) -> Arc<MockTestService>;
    fn mock_test_admin(&self) -> Arc<MockTestAdminService>;
    fn exams(&self) -> Arc<ExamService>;
    fn tasks(&self) -> Arc<TaskService>;
    fn schools(&self) -> Arc<SchoolService>;
    fn sales_team(&self) -> Arc<SalesTeamService>;
    fn users(&self) -> Arc<UserService>;
    fn blogs(&self) -> Arc<BlogService>;
    fn results(&self) -> Arc<ResultService>;
}

impl UiApp for AppServices {
    fn auth(&self) -> Arc<AuthService> {
        AppServices::auth(self)
    }

    fn mock_tests(&self) -> Arc<MockTestService> {
        AppServices::mock_tests(self)
    }

    fn mock_test_admin(&self) -> Arc<MockTestAdminService> {
        AppServices::mock_test_admin(self)
    }

    fn exams(&self) -> Arc<ExamService> {
        AppServices::exams(self)
    }

    fn tasks(&self) -> Arc<TaskService> {
        AppServices::tasks(self)
    }

    fn schools(&self) -> Arc<SchoolService> {
        AppServices::schools(self)
    }

    fn sales_team(&self) -> Arc<SalesTeamService> {
        AppServices::sales_team(self)
    }

    fn users(&self) -> Arc<UserService> {
        AppServices::users(self)
    }

    fn blogs(&self) -> Arc<BlogService> {
        AppServices::blogs(self)
    }

    fn results(&self) -> Arc<ResultService> {
        AppServices::results(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    initial_user: Option<SessionUser>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: Arc<dyn UiApp>, initial_user: Option<SessionUser>) -> Self {
        Self { app, initial_user }
    }

    /// The login restored at startup, used to seed `SessionHandle`.
    #[must_use]
    pub fn initial_user(&self) -> Option<SessionUser> {
        self.initial_user.clone()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        self.app.auth()
    }

    #[must_use]
    pub fn mock_tests(&self) -> Arc<MockTestService> {
        self.app.mock_tests()
    }

    #[must_use]
    pub fn mock_test_admin(&self) -> Arc<MockTestAdminService> {
        self.app.mock_test_admin()
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        self.app.exams()
    }

    #[must_use]
    pub fn tasks(&self) -> Arc<TaskService> {
        self.app.tasks()
    }

    #[must_use]
    pub fn schools(&self) -> Arc<SchoolService> {
        self.app.schools()
    }

    #[must_use]
    pub fn sales_team(&self) -> Arc<SalesTeamService> {
        self.app.sales_team()
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        self.app.users()
    }

    #[must_use]
    pub fn blogs(&self) -> Arc<BlogService> {
        self.app.blogs()
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultService> {
        self.app.results()
    }
}

// Provided by the composition root (`crates/app`) or the test harness.

#[must_use]
pub fn build_app_context(app: Arc<dyn UiApp>, initial_user: Option<SessionUser>) -> AppContext {
    AppContext::new(app, initial_user)
}

/// The signed-in user, shared by every view.
///
/// Set on login, cleared on logout; nothing else writes it.
#[derive(Clone, Copy, PartialEq)]
pub struct SessionHandle {
    user: Signal<Option<SessionUser>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(user: Signal<Option<SessionUser>>) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn current(&self) -> Option<SessionUser> {
        self.user.read().clone()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.read().as_ref().map(SessionUser::role)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    pub fn sign_in(&self, user: SessionUser) {
        let mut signal = self.user;
        signal.set(Some(user));
    }

    pub fn sign_out(&self) {
        let mut signal = self.user;
        signal.set(None);
    }
}

/// Provide a `SessionHandle` seeded from the context's restored user.
pub fn use_session_provider(ctx: &AppContext) -> SessionHandle {
    let initial = ctx.initial_user();
    let user = use_signal(move || initial);
    use_context_provider(move || SessionHandle::new(user))
}

/// Raised while a mock test is running. Navigation and window close are
/// held back until it drops.
#[derive(Clone, Copy, PartialEq)]
pub struct ExamLock {
    locked: Signal<bool>,
}

impl ExamLock {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        *self.locked.read()
    }

    pub fn set(&self, locked: bool) {
        let mut signal = self.locked;
        if *signal.peek() != locked {
            signal.set(locked);
        }
    }
}

pub fn use_exam_lock_provider() -> ExamLock {
    let locked = use_signal(|| false);
    use_context_provider(move || ExamLock { locked })
}
