use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable, use_navigator, use_route};
use olympiad_core::model::Role;

use crate::context::SessionHandle;
use crate::views::{
    AdminDashboard, BlogListView, BlogPostView, BlogsView, ExamsView, HomeView, LoginView,
    MockTestAdminView, MockTestListView, MockTestResultView, MockTestView, NavBar, RegisterView,
    ResultsView, SalesDashboard, SalesTeamView, SchoolDashboard, SchoolsView, StudentDashboard,
    TasksView, UsersView,
};

#[derive(Clone, Routable, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[route("/", HomeView)] Home {},
    #[route("/login", LoginView)] Login {},
    #[route("/register", RegisterView)] Register {},
    #[route("/blogs", BlogListView)] Blogs {},
    #[route("/blogs/:slug", BlogPostView)] BlogPost { slug: String },
    #[route("/dashboard", HomeView)] Dashboard {},
    #[layout(RoleGate)]
        #[route("/admin", AdminDashboard)] Admin {},
        #[route("/admin/schools", SchoolsView)] AdminSchools {},
        #[route("/admin/sales-team", SalesTeamView)] AdminSalesTeam {},
        #[route("/admin/users", UsersView)] AdminUsers {},
        #[route("/admin/blogs", BlogsView)] AdminBlogs {},
        #[route("/admin/mock-tests", MockTestAdminView)] AdminMockTests {},
        #[route("/admin/exams", ExamsView)] AdminExams {},
        #[route("/admin/tasks", TasksView)] AdminTasks {},
        #[route("/school", SchoolDashboard)] School {},
        #[route("/school/students", UsersView)] SchoolStudents {},
        #[route("/sales", SalesDashboard)] Sales {},
        #[route("/sales/schools", SchoolsView)] SalesSchools {},
        #[route("/sales/tasks", TasksView)] SalesTasks {},
        #[route("/student", StudentDashboard)] Student {},
        #[route("/student/results", ResultsView)] StudentResults {},
        #[route("/mock-tests", MockTestListView)] MockTests {},
        #[route("/mock-tests/:id", MockTestView)] MockTest { id: u64 },
        #[route("/mock-tests/:id/result", MockTestResultView)] MockTestResult { id: u64 },
}

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Only(Role),
}

impl Access {
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::Public => true,
            Self::Only(only) => only == role,
        }
    }
}

impl Route {
    /// Landing page for a role.
    #[must_use]
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin {},
            Role::School => Self::School {},
            Role::Salesman => Self::Sales {},
            Role::Student => Self::Student {},
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Home {}
            | Self::Login {}
            | Self::Register {}
            | Self::Blogs {}
            | Self::BlogPost { .. }
            | Self::Dashboard {} => Access::Public,
            Self::Admin {}
            | Self::AdminSchools {}
            | Self::AdminSalesTeam {}
            | Self::AdminUsers {}
            | Self::AdminBlogs {}
            | Self::AdminMockTests {}
            | Self::AdminExams {}
            | Self::AdminTasks {} => Access::Only(Role::Admin),
            Self::School {} | Self::SchoolStudents {} => Access::Only(Role::School),
            Self::Sales {} | Self::SalesSchools {} | Self::SalesTasks {} => {
                Access::Only(Role::Salesman)
            }
            Self::Student {}
            | Self::StudentResults {}
            | Self::MockTests {}
            | Self::MockTest { .. }
            | Self::MockTestResult { .. } => Access::Only(Role::Student),
        }
    }
}

/// Where a visitor should be sent instead of `route`, if anywhere.
#[must_use]
pub fn redirect_for(route: &Route, role: Option<Role>) -> Option<Route> {
    match (route.access(), role) {
        (Access::Public, _) => None,
        (_, None) => Some(Route::Login {}),
        (access, Some(role)) if access.admits(role) => None,
        (_, Some(role)) => Some(Route::dashboard_for(role)),
    }
}

/// Layout for signed-in routes: bounces visitors to login or their own dashboard.
#[component]
fn RoleGate() -> Element {
    let session = use_context::<SessionHandle>();
    let route = use_route::<Route>();
    let navigator = use_navigator();
    let redirect = redirect_for(&route, session.role());

    use_effect(use_reactive!(|redirect| {
        if let Some(target) = redirect {
            tracing::debug!(?target, "redirecting");
            navigator.replace(target);
        }
    }));

    if redirect.is_some() {
        return rsx! {
            div { class: "page", p { "Redirecting..." } }
        };
    }

    rsx! {
        div { class: "app",
            NavBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_lands_on_an_admitted_dashboard() {
        for role in Role::ALL {
            let dashboard = Route::dashboard_for(role);
            assert!(dashboard.access().admits(role), "{role:?}");
            assert_eq!(redirect_for(&dashboard, Some(role)), None);
        }
    }

    #[test]
    fn anonymous_visitors_go_to_login() {
        assert_eq!(
            redirect_for(&Route::AdminUsers {}, None),
            Some(Route::Login {})
        );
        assert_eq!(redirect_for(&Route::Login {}, None), None);
    }

    #[test]
    fn wrong_role_goes_home_to_own_dashboard() {
        assert_eq!(
            redirect_for(&Route::MockTest { id: 3 }, Some(Role::Admin)),
            Some(Route::Admin {})
        );
        assert_eq!(
            redirect_for(&Route::AdminBlogs {}, Some(Role::Salesman)),
            Some(Route::Sales {})
        );
    }

    #[test]
    fn sign_up_and_blog_reader_are_public() {
        let slug = Route::BlogPost {
            slug: "exam-tips".into(),
        };
        for route in [Route::Register {}, Route::Blogs {}, slug] {
            assert_eq!(redirect_for(&route, None), None, "{route:?}");
        }
    }

    #[test]
    fn authoring_boards_stay_with_admins() {
        for route in [
            Route::AdminMockTests {},
            Route::AdminExams {},
            Route::AdminTasks {},
        ] {
            assert_eq!(
                redirect_for(&route, Some(Role::Salesman)),
                Some(Route::Sales {})
            );
        }
        assert_eq!(redirect_for(&Route::SalesTasks {}, Some(Role::Salesman)), None);
        assert_eq!(
            redirect_for(&Route::SalesTasks {}, Some(Role::Student)),
            Some(Route::Student {})
        );
    }
}
