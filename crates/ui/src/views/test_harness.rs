use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use olympiad_core::model::{MatchSetId, Role, SessionUser, UserId};
use olympiad_core::time::fixed_now;
use services::{AppServices, Clock};
use storage::repository::{InMemoryRepository, Storage};

use crate::context::{
    AppContext, SessionHandle, UiApp, build_app_context, use_exam_lock_provider,
    use_session_provider,
};
use crate::views::mock_test::{ExamRunner, LoadedAttempt};
use crate::views::{
    AdminDashboard, BlogListView, BlogPostView, BlogsView, ExamsView, LoginView,
    MockTestAdminView, MockTestListView, MockTestView, NavBar, RegisterView, ResultsView,
    SalesTeamView, SchoolsView, TasksView, UsersView,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewKind {
    Login,
    AdminDashboard,
    Schools,
    SalesTeam,
    Users,
    Blogs,
    Results,
    MockTests,
    MockTest(u64),
    /// An attempt already started, with the nav bar beside it.
    StartedExam(u64),
    MockTestAdmin,
    Exams,
    Tasks,
    Register,
    BlogList,
    BlogPost(&'static str),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<AppServices>,
    user: Option<SessionUser>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    let user = props.user.clone();
    let ctx = use_context_provider(move || build_app_context(app, user));
    use_session_provider(&ctx);
    use_exam_lock_provider();
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
    #[route("/:..segments")]
    Elsewhere { segments: Vec<String> },
}

/// Where views land after navigating away from the view under test.
#[component]
fn Elsewhere(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        NavBar {}
        p { class: "elsewhere", "navigated to /{path}" }
    }
}

#[component]
fn StartedExam(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let attempt = use_resource(move || {
        let mock_tests = ctx.mock_tests();
        async move {
            let student = session.current()?.id();
            let mut loaded = mock_tests.load(MatchSetId::new(id), student).await.ok()?;
            mock_tests.start(&mut loaded).await.ok()?;
            Some(LoadedAttempt(loaded))
        }
    });
    let loaded = attempt.read().clone().flatten();

    rsx! {
        NavBar {}
        if let Some(loaded) = loaded {
            ExamRunner { loaded }
        }
    }
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::AdminDashboard => rsx! { AdminDashboard {} },
        ViewKind::Schools => rsx! { SchoolsView {} },
        ViewKind::SalesTeam => rsx! { SalesTeamView {} },
        ViewKind::Users => rsx! { UsersView {} },
        ViewKind::Blogs => rsx! { BlogsView {} },
        ViewKind::Results => rsx! { ResultsView {} },
        ViewKind::MockTests => rsx! { MockTestListView {} },
        ViewKind::MockTest(id) => rsx! { MockTestView { id } },
        ViewKind::StartedExam(id) => rsx! { StartedExam { id } },
        ViewKind::MockTestAdmin => rsx! { MockTestAdminView {} },
        ViewKind::Exams => rsx! { ExamsView {} },
        ViewKind::Tasks => rsx! { TasksView {} },
        ViewKind::Register => rsx! { RegisterView {} },
        ViewKind::BlogList => rsx! { BlogListView {} },
        ViewKind::BlogPost(slug) => rsx! { BlogPostView { slug: slug.to_string() } },
    }
}

pub fn user(role: Role) -> SessionUser {
    let id = match role {
        Role::Admin => 1,
        Role::School => 2,
        Role::Salesman => 3,
        Role::Student => 4,
    };
    SessionUser::new(
        UserId::new(id),
        format!("{role} user"),
        format!("{}@example.com", role.as_str()),
        role,
    )
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: InMemoryRepository,
    pub services: Arc<AppServices>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        self.dom.process_events();
        self.dom.render_immediate(&mut NoOpMutations);
    }

    /// Let pending resources resolve and re-render.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

/// Services over a seedable in-memory backend; call `rebuild` after seeding.
pub fn setup_view_harness(view: ViewKind, signed_in: Option<SessionUser>) -> ViewHarness {
    let repo = InMemoryRepository::new();
    let storage = Storage::from_in_memory(&repo);
    let services = Arc::new(AppServices::new(&storage, Clock::fixed(fixed_now())));
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::clone(&services),
            user: signed_in,
            view,
        },
    );
    ViewHarness {
        dom,
        repo,
        services,
    }
}
