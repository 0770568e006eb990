use dioxus::prelude::*;
use dioxus_router::Link;
use olympiad_core::model::MatchSetId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::AttemptVm;

#[component]
pub fn MockTestResultView(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let attempt = ctx
        .mock_tests()
        .completed_attempt(MatchSetId::new(id))
        .as_ref()
        .map(AttemptVm::from);

    let Some(vm) = attempt else {
        return rsx! {
            div { class: "page",
                p { class: "empty", "No result found for this test." }
                Link { class: "btn", to: Route::MockTests {}, "Back to Mock Tests" }
            }
        };
    };

    let status_class = if vm.passed { "result-status pass" } else { "result-status fail" };

    rsx! {
        div { class: "page result-page",
            div { class: "card result-card",
                h2 { "{vm.exam_title}" }
                if vm.auto_submitted {
                    p { class: "notice", "Time was up, so your answers were submitted automatically." }
                }
                p { class: "result-score", "{vm.percentage_label}" }
                p { class: "{status_class}", "{vm.status}" }
                div { class: "stat-grid",
                    div { class: "stat-card", h3 { "Total" } p { class: "stat-value", "{vm.total}" } }
                    div { class: "stat-card", h3 { "Correct" } p { class: "stat-value", "{vm.correct}" } }
                    div { class: "stat-card", h3 { "Incorrect" } p { class: "stat-value", "{vm.incorrect}" } }
                    div { class: "stat-card", h3 { "Unanswered" } p { class: "stat-value", "{vm.unanswered}" } }
                }
                p { class: "muted", "Time spent: {vm.time_spent}" }
                div { class: "quick-links",
                    Link { class: "btn", to: Route::MockTests {}, "More Mock Tests" }
                    Link { class: "btn btn-primary", to: Route::StudentResults {}, "My Results" }
                }
            }
        }
    }
}
