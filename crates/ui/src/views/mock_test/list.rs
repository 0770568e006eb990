use dioxus::prelude::*;
use dioxus_router::Link;
use olympiad_core::model::MatchSetSummary;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::state::{ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::format_date;

#[component]
pub fn MockTestListView() -> Element {
    let ctx = use_context::<AppContext>();

    let mut resource = use_resource(move || {
        let mock_tests = ctx.mock_tests();
        async move {
            let tests = mock_tests.list_match_sets().await?;
            Ok::<_, ViewError>(tests)
        }
    });

    rsx! {
        div { class: "page",
            header { class: "page-header", h2 { "Mock Tests" } }
            match view_state_from_resource(&resource) {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "muted", "Loading mock tests..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorPanel { error, on_retry: move |()| resource.restart() }
                },
                ViewState::Ready(tests) if tests.is_empty() => rsx! {
                    p { class: "empty", "No mock tests are available right now." }
                },
                ViewState::Ready(tests) => rsx! {
                    div { class: "test-grid",
                        for test in tests {
                            TestCard { key: "{test.id}", test: test.clone() }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn TestCard(test: MatchSetSummary) -> Element {
    let date = format_date(test.date);
    rsx! {
        article { class: "card test-card",
            h3 { "{test.title}" }
            p { class: "muted", "{test.subject} · {date}" }
            ul { class: "test-facts",
                li { "{test.question_count} questions" }
                li { "{test.duration_minutes} minutes" }
            }
            Link {
                class: "btn btn-primary",
                to: Route::MockTest { id: test.id.value() },
                "Start Test"
            }
        }
    }
}
