use dioxus::prelude::*;
use olympiad_core::model::{
    DraftErrors, RecommendationFilter, UpcomingExam, UpcomingExamDraft, UpcomingExamFilter,
    UpcomingExamId,
};
use services::ListState;

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{ConfirmDialog, FormMode, TextArea, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

/// Upcoming-exam board for admins.
#[component]
pub fn ExamsView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let exams = ctx.exams();

    let list = use_signal(ListState::<UpcomingExam>::new);
    let mut filter = use_signal(UpcomingExamFilter::default);
    let banner = use_signal(|| None::<String>);
    let mut mode = use_signal(|| FormMode::<UpcomingExamId>::Closed);
    let mut draft = use_signal(UpcomingExamDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<UpcomingExam>);

    let mut loader = use_resource({
        let exams = exams.clone();
        move || {
            let exams = exams.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = exams.list(&viewer).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_save = {
        let exams = exams.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let exams = exams.clone();
            let target = mode();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = match &target {
                    FormMode::Edit(id) => exams.update(&viewer, id, submitted).await,
                    _ => exams.create(&viewer, submitted).await,
                };
                saving.set(false);
                match outcome {
                    Ok(exam) => {
                        if target.is_edit() {
                            list.write().apply_updated(exam);
                        } else {
                            list.write().apply_created(exam);
                        }
                        errors.set(None);
                        mode.set(FormMode::Closed);
                    }
                    Err(err) => {
                        errors.set(err.field_errors().cloned());
                        banner.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let on_recommend = use_callback({
        let exams = exams.clone();
        move |exam: UpcomingExam| {
            let Some(viewer) = session.current() else {
                return;
            };
            let exams = exams.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match exams.toggle_recommended(&viewer, &exam).await {
                    Ok(exam) => list.write().apply_updated(exam),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    });

    let on_confirm_delete = {
        let exams = exams.clone();
        move |()| {
            let Some(exam) = pending_delete.take() else {
                return;
            };
            let Some(viewer) = session.current() else {
                return;
            };
            let exams = exams.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match exams.remove(&viewer, &exam.id).await {
                    Ok(()) => list.write().apply_removed(&exam.id),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    };

    let current_filter = filter();
    let rows: Vec<UpcomingExam> = current_filter
        .apply(list.read().items())
        .into_iter()
        .cloned()
        .collect();
    let load_state = view_state_from_resource(&loader);
    let loaded = list.read().is_loaded();

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Upcoming Exams" }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| {
                        draft.set(UpcomingExamDraft::default());
                        errors.set(None);
                        mode.set(FormMode::Create);
                    },
                    "Add Exam"
                }
            }
            Banner { message: banner }
            div { class: "tabs",
                for tab in RecommendationFilter::ALL {
                    button {
                        key: "{tab.label()}",
                        class: if current_filter.recommendation == tab { "tab tab-active" } else { "tab" },
                        onclick: move |_| filter.write().recommendation = tab,
                        "{tab.label()}"
                    }
                }
            }
            input {
                class: "input search",
                r#type: "search",
                placeholder: "Search by title or subject...",
                value: "{current_filter.search}",
                oninput: move |evt| filter.write().search = evt.value(),
            }
            if mode.read().is_open() {
                form { class: "card form-card", onsubmit: on_save,
                    h3 { if mode.read().is_edit() { "Edit Exam" } else { "Add Exam" } }
                    TextField {
                        label: "Title",
                        value: draft.read().title.clone(),
                        on_input: move |value| draft.write().title = value,
                        error: field_error(&errors, "title"),
                    }
                    TextField {
                        label: "Subject",
                        value: draft.read().subject.clone(),
                        on_input: move |value| draft.write().subject = value,
                        error: field_error(&errors, "subject"),
                    }
                    TextField {
                        label: "Date",
                        kind: "date",
                        value: draft.read().date.clone(),
                        on_input: move |value| draft.write().date = value,
                        error: field_error(&errors, "date"),
                    }
                    TextField {
                        label: "Time",
                        kind: "time",
                        value: draft.read().time.clone(),
                        on_input: move |value| draft.write().time = value,
                        error: field_error(&errors, "time"),
                    }
                    TextField {
                        label: "Duration",
                        value: draft.read().duration.clone(),
                        placeholder: "e.g. 2 hours",
                        on_input: move |value| draft.write().duration = value,
                    }
                    TextField {
                        label: "Image URL",
                        kind: "url",
                        value: draft.read().image_url.clone(),
                        on_input: move |value| draft.write().image_url = value,
                        error: field_error(&errors, "image_url"),
                    }
                    TextArea {
                        label: "Description",
                        rows: 4,
                        value: draft.read().description.clone(),
                        on_input: move |value| draft.write().description = value,
                    }
                    div { class: "form-actions",
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| mode.set(FormMode::Closed),
                            "Cancel"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Saving..." } else { "Save" }
                        }
                    }
                }
            }
            match load_state {
                ViewState::Error(error) if !loaded => rsx! {
                    ErrorPanel { error, on_retry: move |()| loader.restart() }
                },
                ViewState::Loading | ViewState::Idle if !loaded => rsx! {
                    p { class: "muted", "Loading exams..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No exams found." }
                    } else {
                        div { class: "card-grid",
                            for exam in rows {
                                ExamCard {
                                    key: "{exam.id}",
                                    exam: exam.clone(),
                                    on_edit: move |exam: UpcomingExam| {
                                        draft.set(exam.to_draft());
                                        errors.set(None);
                                        mode.set(FormMode::Edit(exam.id));
                                    },
                                    on_recommend,
                                    on_delete: move |exam: UpcomingExam| pending_delete.set(Some(exam)),
                                }
                            }
                        }
                    }
                },
            }
            if let Some(exam) = pending_delete.read().clone() {
                ConfirmDialog {
                    message: format!("Delete {}? This cannot be undone.", exam.title),
                    confirm_label: "Delete",
                    on_confirm: on_confirm_delete,
                    on_cancel: move |()| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn ExamCard(
    exam: UpcomingExam,
    on_edit: EventHandler<UpcomingExam>,
    on_recommend: EventHandler<UpcomingExam>,
    on_delete: EventHandler<UpcomingExam>,
) -> Element {
    let date = exam
        .date
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_default();
    let recommend_label = if exam.recommended {
        "Unrecommend"
    } else {
        "Recommend"
    };
    let edit_target = exam.clone();
    let recommend_target = exam.clone();
    let delete_target = exam.clone();

    rsx! {
        article { class: "card exam-card",
            if let Some(url) = exam.image_url.clone() {
                img { class: "exam-image", src: "{url}", alt: "{exam.title}" }
            }
            h3 { "{exam.title}" }
            if exam.recommended {
                span { class: "badge badge-recommended", "Recommended" }
            }
            p { class: "muted", "{exam.subject} · {date} {exam.time}" }
            if let Some(duration) = exam.duration.clone() {
                p { class: "muted", "Duration: {duration}" }
            }
            if let Some(description) = exam.description.clone() {
                p { "{description}" }
            }
            div { class: "actions",
                button { class: "btn btn-small", onclick: move |_| on_edit.call(edit_target.clone()), "Edit" }
                button {
                    class: "btn btn-small",
                    onclick: move |_| on_recommend.call(recommend_target.clone()),
                    "{recommend_label}"
                }
                button {
                    class: "btn btn-small btn-danger",
                    onclick: move |_| on_delete.call(delete_target.clone()),
                    "Delete"
                }
            }
        }
    }
}
