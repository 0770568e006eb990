use dioxus::prelude::*;
use olympiad_core::model::ResultStats;
use services::ResultService;

use crate::context::{AppContext, SessionHandle};
use crate::views::state::{ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultRowVm, map_result_rows};

#[derive(Clone, Debug, PartialEq)]
struct ResultsData {
    stats: ResultStats,
    rows: Vec<ResultRowVm>,
}

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();

    let mut resource = use_resource(move || {
        let results = ctx.results();
        async move {
            let viewer = session.current().ok_or(ViewError::Unknown)?;
            let rows = results.list(&viewer).await?;
            Ok::<_, ViewError>(ResultsData {
                stats: ResultService::stats(&rows),
                rows: map_result_rows(&rows),
            })
        }
    });

    rsx! {
        div { class: "page",
            header { class: "page-header", h2 { "My Exam Results" } }
            match view_state_from_resource(&resource) {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "muted", "Loading results..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorPanel { error, on_retry: move |()| resource.restart() }
                },
                ViewState::Ready(data) => rsx! {
                    div { class: "stat-grid",
                        div { class: "card stat-card",
                            h3 { "Exams Taken" }
                            p { class: "stat-value", "{data.stats.total}" }
                        }
                        div { class: "card stat-card",
                            h3 { "Average Score" }
                            p { class: "stat-value", "{data.stats.average}%" }
                        }
                        div { class: "card stat-card",
                            h3 { "Best Score" }
                            p { class: "stat-value", "{data.stats.best}%" }
                        }
                    }
                    if data.rows.is_empty() {
                        p { class: "empty", "No exam results yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Exam" }
                                    th { "Subject" }
                                    th { "Date" }
                                    th { "Time" }
                                    th { "Score" }
                                    th { "Grade" }
                                    th { "Certificate" }
                                }
                            }
                            tbody {
                                for row in data.rows {
                                    tr {
                                        td { "{row.exam_title}" }
                                        td { "{row.subject}" }
                                        td { "{row.date}" }
                                        td { "{row.time}" }
                                        td { "{row.score}" }
                                        td { span { class: "grade {row.grade_class}", "{row.grade}" } }
                                        td {
                                            if let Some(url) = row.certificate_url {
                                                a { href: "{url}", target: "_blank", "Download" }
                                            } else {
                                                span { class: "muted", "-" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
