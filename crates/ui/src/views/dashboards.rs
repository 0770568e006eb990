use dioxus::prelude::*;
use dioxus_router::Link;
use services::ResultService;

use crate::context::{AppContext, SessionHandle};
use crate::routes::Route;
use crate::views::state::{ErrorPanel, ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct Stat {
    label: &'static str,
    value: String,
}

impl Stat {
    fn count(label: &'static str, value: usize) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

#[component]
fn StatGrid(stats: Vec<Stat>) -> Element {
    rsx! {
        div { class: "stat-grid",
            for stat in stats {
                div { class: "card stat-card",
                    h3 { "{stat.label}" }
                    p { class: "stat-value", "{stat.value}" }
                }
            }
        }
    }
}

#[component]
fn Dashboard(
    #[props(into)] title: String,
    state: ViewState<Vec<Stat>>,
    on_retry: EventHandler<()>,
    links: Vec<(&'static str, Route)>,
) -> Element {
    rsx! {
        div { class: "page",
            header { class: "page-header", h2 { "{title}" } }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! { p { class: "muted", "Loading..." } },
                ViewState::Error(error) => rsx! { ErrorPanel { error, on_retry } },
                ViewState::Ready(stats) => rsx! { StatGrid { stats } },
            }
            div { class: "quick-links",
                for (label, route) in links {
                    Link { class: "btn", to: route, "{label}" }
                }
            }
        }
    }
}

#[component]
pub fn AdminDashboard() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();

    let mut stats = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let viewer = session.current().ok_or(ViewError::Unknown)?;
            let users = ctx.users().list(&viewer).await?;
            let schools = ctx.schools().list(&viewer, false).await?;
            let sales = ctx.sales_team().list(&viewer).await?;
            let blogs = ctx.blogs().list().await?;
            Ok::<_, ViewError>(vec![
                Stat::count("Total Students", users.len()),
                Stat::count("Total Schools", schools.len()),
                Stat::count("Sales Team", sales.len()),
                Stat::count("Blog Posts", blogs.len()),
            ])
        }
    });

    rsx! {
        Dashboard {
            title: "Admin Dashboard",
            state: view_state_from_resource(&stats),
            on_retry: move |()| stats.restart(),
            links: vec![
                ("Manage Schools", Route::AdminSchools {}),
                ("Manage Sales Team", Route::AdminSalesTeam {}),
                ("Manage Users", Route::AdminUsers {}),
                ("Manage Blogs", Route::AdminBlogs {}),
                ("Author Mock Tests", Route::AdminMockTests {}),
                ("Upcoming Exams", Route::AdminExams {}),
                ("Assign Tasks", Route::AdminTasks {}),
            ],
        }
    }
}

#[component]
pub fn SchoolDashboard() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();

    let mut stats = use_resource(move || {
        let users = ctx.users();
        async move {
            let viewer = session.current().ok_or(ViewError::Unknown)?;
            let students = users.list(&viewer).await?;
            let registrations = students
                .iter()
                .map(|student| student.registered_exams.len())
                .sum();
            Ok::<_, ViewError>(vec![
                Stat::count("Students", students.len()),
                Stat::count("Exam Registrations", registrations),
            ])
        }
    });

    let name = session.current().map(|user| user.name().to_string()).unwrap_or_default();

    rsx! {
        Dashboard {
            title: format!("Welcome, {name}"),
            state: view_state_from_resource(&stats),
            on_retry: move |()| stats.restart(),
            links: vec![("View Students", Route::SchoolStudents {})],
        }
    }
}

#[component]
pub fn SalesDashboard() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();

    let mut stats = use_resource(move || {
        let schools = ctx.schools();
        async move {
            let viewer = session.current().ok_or(ViewError::Unknown)?;
            let all = schools.list(&viewer, false).await?;
            let active = all.iter().filter(|school| school.status.is_active()).count();
            Ok::<_, ViewError>(vec![
                Stat::count("Schools", all.len()),
                Stat::count("Active Schools", active),
                Stat::count("Inactive Schools", all.len() - active),
            ])
        }
    });

    rsx! {
        Dashboard {
            title: "Sales Dashboard",
            state: view_state_from_resource(&stats),
            on_retry: move |()| stats.restart(),
            links: vec![
                ("Manage Schools", Route::SalesSchools {}),
                ("My Tasks", Route::SalesTasks {}),
            ],
        }
    }
}

#[component]
pub fn StudentDashboard() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();

    let mut stats = use_resource(move || {
        let results = ctx.results();
        async move {
            let viewer = session.current().ok_or(ViewError::Unknown)?;
            let rows = results.list(&viewer).await?;
            let summary = ResultService::stats(&rows);
            Ok::<_, ViewError>(vec![
                Stat::count("Total Exams", summary.total),
                Stat {
                    label: "Average Score",
                    value: format!("{}%", summary.average),
                },
                Stat {
                    label: "Best Score",
                    value: format!("{}%", summary.best),
                },
            ])
        }
    });

    let name = session.current().map(|user| user.name().to_string()).unwrap_or_default();

    rsx! {
        Dashboard {
            title: format!("Welcome, {name}"),
            state: view_state_from_resource(&stats),
            on_retry: move |()| stats.restart(),
            links: vec![
                ("Take a Mock Test", Route::MockTests {}),
                ("My Results", Route::StudentResults {}),
            ],
        }
    }
}
