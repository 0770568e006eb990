use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use olympiad_core::model::Role;

use crate::context::{AppContext, ExamLock, SessionHandle};
use crate::routes::Route;

fn links_for(role: Role) -> Vec<(&'static str, Route)> {
    match role {
        Role::Admin => vec![
            ("Dashboard", Route::Admin {}),
            ("Schools", Route::AdminSchools {}),
            ("Sales Team", Route::AdminSalesTeam {}),
            ("Users", Route::AdminUsers {}),
            ("Mock Tests", Route::AdminMockTests {}),
            ("Exams", Route::AdminExams {}),
            ("Tasks", Route::AdminTasks {}),
            ("Blogs", Route::AdminBlogs {}),
        ],
        Role::School => vec![
            ("Dashboard", Route::School {}),
            ("Students", Route::SchoolStudents {}),
        ],
        Role::Salesman => vec![
            ("Dashboard", Route::Sales {}),
            ("Schools", Route::SalesSchools {}),
            ("Tasks", Route::SalesTasks {}),
        ],
        Role::Student => vec![
            ("Dashboard", Route::Student {}),
            ("Mock Tests", Route::MockTests {}),
            ("My Results", Route::StudentResults {}),
        ],
    }
}

#[component]
pub fn NavBar() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let navigator = use_navigator();
    let exam_lock = use_hook(try_consume_context::<ExamLock>);
    let locked = exam_lock.is_some_and(|lock| lock.is_locked());
    let user = session.current();

    let on_logout = move |_| {
        if locked {
            return;
        }
        let auth = ctx.auth();
        let Some(user) = session.current() else {
            return;
        };
        spawn(async move {
            auth.logout(&user).await;
            session.sign_out();
            navigator.replace(Route::Login {});
        });
    };

    rsx! {
        nav { class: "sidebar",
            h1 { "Olympiad" }
            if let Some(user) = user {
                p { class: "sidebar-user",
                    span { "{user.name()}" }
                    span { class: "role-badge", "{user.role().label()}" }
                }
                if locked {
                    p { class: "nav-lock-note", "Finish your test to leave this page." }
                }
                ul {
                    for (label, route) in links_for(user.role()) {
                        if locked {
                            li { span { class: "nav-locked", "{label}" } }
                        } else {
                            li { Link { to: route, "{label}" } }
                        }
                    }
                }
                button {
                    class: "btn btn-secondary",
                    disabled: locked,
                    onclick: on_logout,
                    "Logout"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nav_link_is_open_to_its_role() {
        for role in Role::ALL {
            for (label, route) in links_for(role) {
                assert!(route.access().admits(role), "{role:?} {label}");
            }
        }
    }
}
