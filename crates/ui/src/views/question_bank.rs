use dioxus::prelude::*;
use olympiad_core::model::{
    DraftErrors, MatchSetDraft, MatchSetId, MatchSetSummary, NewQuestion, QUESTION_OPTION_COUNT,
    QuestionDraft,
};
use services::{
    ListState, MockTestAdminService, QUESTION_TEMPLATE_CSV, QUESTION_TEMPLATE_FILE_NAME,
    SkippedRow,
};
use tracing::{info, warn};

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{ConfirmDialog, TextArea, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

const OPTION_LABELS: [&str; QUESTION_OPTION_COUNT] = ["Option A", "Option B", "Option C", "Option D"];

/// Admin authoring of mock tests: create, delete and fill with questions.
#[component]
pub fn MockTestAdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let admin = ctx.mock_test_admin();

    let list = use_signal(ListState::<MatchSetSummary>::new);
    let banner = use_signal(|| None::<String>);
    let mut form_open = use_signal(|| false);
    let mut draft = use_signal(MatchSetDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<MatchSetSummary>);
    let mut authoring = use_signal(|| None::<MatchSetSummary>);

    let mut loader = use_resource({
        let admin = admin.clone();
        move || {
            let admin = admin.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = admin.list(&viewer).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_create = {
        let admin = admin.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let admin = admin.clone();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = admin.create(&viewer, submitted).await;
                saving.set(false);
                match outcome {
                    Ok(summary) => {
                        list.write().apply_created(summary.clone());
                        errors.set(None);
                        form_open.set(false);
                        authoring.set(Some(summary));
                    }
                    Err(err) => {
                        errors.set(err.field_errors().cloned());
                        banner.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let on_confirm_delete = {
        let admin = admin.clone();
        move |()| {
            let Some(summary) = pending_delete.take() else {
                return;
            };
            let Some(viewer) = session.current() else {
                return;
            };
            let admin = admin.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match admin.remove(&viewer, summary.id).await {
                    Ok(()) => {
                        list.write().apply_removed(&summary.id);
                        if authoring.peek().as_ref().is_some_and(|open| open.id == summary.id) {
                            authoring.set(None);
                        }
                    }
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    };

    let on_uploaded = move |(id, added): (MatchSetId, usize)| {
        let mut list = list;
        let updated = list.read().items().iter().find(|summary| summary.id == id).cloned();
        if let Some(mut summary) = updated {
            summary.question_count += u32::try_from(added).unwrap_or(u32::MAX);
            list.write().apply_updated(summary);
        }
    };

    let rows = list.read().items().to_vec();
    let load_state = view_state_from_resource(&loader);
    let loaded = list.read().is_loaded();

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Mock Tests" }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| {
                        draft.set(MatchSetDraft::default());
                        errors.set(None);
                        form_open.set(true);
                    },
                    "Create Mock Test"
                }
            }
            Banner { message: banner }
            if form_open() {
                form { class: "card form-card", onsubmit: on_create,
                    h3 { "New Mock Test" }
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
                        label: "Duration (minutes)",
                        kind: "number",
                        value: draft.read().duration_minutes.clone(),
                        on_input: move |value| draft.write().duration_minutes = value,
                        error: field_error(&errors, "duration_minutes"),
                    }
                    div { class: "form-actions",
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| form_open.set(false),
                            "Cancel"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Creating..." } else { "Create" }
                        }
                    }
                }
            }
            if let Some(summary) = authoring() {
                QuestionUploader {
                    key: "{summary.id}",
                    exam: summary,
                    on_uploaded,
                    on_close: move |()| authoring.set(None),
                }
            }
            match load_state {
                ViewState::Error(error) if !loaded => rsx! {
                    ErrorPanel { error, on_retry: move |()| loader.restart() }
                },
                ViewState::Loading | ViewState::Idle if !loaded => rsx! {
                    p { class: "muted", "Loading mock tests..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No mock tests yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Title" }
                                    th { "Subject" }
                                    th { "Date" }
                                    th { "Duration" }
                                    th { "Questions" }
                                    th { "Actions" }
                                }
                            }
                            tbody {
                                for summary in rows {
                                    MatchSetRow {
                                        key: "{summary.id}",
                                        summary: summary.clone(),
                                        on_author: move |summary: MatchSetSummary| authoring.set(Some(summary)),
                                        on_delete: move |summary: MatchSetSummary| pending_delete.set(Some(summary)),
                                    }
                                }
                            }
                        }
                    }
                },
            }
            if let Some(summary) = pending_delete.read().clone() {
                ConfirmDialog {
                    message: format!("Delete {} and all of its questions?", summary.title),
                    confirm_label: "Delete",
                    on_confirm: on_confirm_delete,
                    on_cancel: move |()| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn MatchSetRow(
    summary: MatchSetSummary,
    on_author: EventHandler<MatchSetSummary>,
    on_delete: EventHandler<MatchSetSummary>,
) -> Element {
    let date = summary
        .date
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_default();
    let author_target = summary.clone();
    let delete_target = summary.clone();

    rsx! {
        tr {
            td { "{summary.title}" }
            td { "{summary.subject}" }
            td { "{date}" }
            td { "{summary.duration_minutes} min" }
            td { "{summary.question_count}" }
            td { class: "actions",
                button {
                    class: "btn btn-small",
                    onclick: move |_| on_author.call(author_target.clone()),
                    "Add Questions"
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

/// Pending batch for one mock test, filled from a CSV file or one question at a time.
#[component]
fn QuestionUploader(
    exam: MatchSetSummary,
    on_uploaded: EventHandler<(MatchSetId, usize)>,
    on_close: EventHandler<()>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let admin = ctx.mock_test_admin();
    let exam_id = exam.id;

    let mut batch = use_signal(Vec::<NewQuestion>::new);
    let mut skipped = use_signal(Vec::<SkippedRow>::new);
    let mut csv_path = use_signal(String::new);
    let mut question = use_signal(QuestionDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let banner = use_signal(|| None::<String>);
    let notice = use_signal(|| None::<String>);
    let uploading = use_signal(|| false);

    let on_import = move |_| {
        let path = csv_path.read().trim().to_string();
        if path.is_empty() {
            return;
        }
        let (mut banner, mut notice) = (banner, notice);
        spawn(async move {
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(%path, error = %err, "question file unreadable");
                    banner.set(Some(format!("Could not read {path}: {err}")));
                    return;
                }
            };
            match MockTestAdminService::parse_question_csv(&text) {
                Ok(import) => {
                    let count = import.questions.len();
                    batch.write().extend(import.questions);
                    skipped.set(import.skipped);
                    notice.set(Some(format!("Read {count} questions from {path}")));
                }
                Err(err) => banner.set(Some(err.user_message())),
            }
        });
    };

    let on_template = move |_| {
        let (mut banner, mut notice) = (banner, notice);
        spawn(async move {
            match tokio::fs::write(QUESTION_TEMPLATE_FILE_NAME, QUESTION_TEMPLATE_CSV).await {
                Ok(()) => notice.set(Some(format!("Template saved to {QUESTION_TEMPLATE_FILE_NAME}"))),
                Err(err) => banner.set(Some(format!("Could not save the template: {err}"))),
            }
        });
    };

    let on_stage = move |evt: FormEvent| {
        evt.prevent_default();
        match MockTestAdminService::stage_question(question()) {
            Ok(staged) => {
                batch.write().push(staged);
                question.set(QuestionDraft::default());
                errors.set(None);
            }
            Err(err) => errors.set(err.field_errors().cloned()),
        }
    };

    let on_upload = move |_| {
        if uploading() {
            return;
        }
        let Some(viewer) = session.current() else {
            return;
        };
        let admin = admin.clone();
        let questions = batch();
        let (mut banner, mut notice, mut uploading) = (banner, notice, uploading);
        spawn(async move {
            uploading.set(true);
            let outcome = admin.upload_questions(&viewer, exam_id, &questions).await;
            uploading.set(false);
            match outcome {
                Ok(()) => {
                    info!(match_set_id = %exam_id, count = questions.len(), "question batch sent");
                    batch.set(Vec::new());
                    skipped.set(Vec::new());
                    notice.set(Some(format!("Uploaded {} questions", questions.len())));
                    on_uploaded.call((exam_id, questions.len()));
                }
                Err(err) => banner.set(Some(err.user_message())),
            }
        });
    };

    let staged = batch();
    let skipped_rows = skipped();

    rsx! {
        section { class: "card question-uploader",
            header { class: "page-header",
                h3 { "Questions for {exam.title}" }
                button { class: "btn", onclick: move |_| on_close.call(()), "Close" }
            }
            Banner { message: banner }
            if let Some(text) = notice() {
                p { class: "notice", "{text}" }
            }
            div { class: "upload-row",
                TextField {
                    label: "CSV file",
                    value: csv_path(),
                    placeholder: "path/to/questions.csv",
                    on_input: move |value| csv_path.set(value),
                }
                button { class: "btn", onclick: on_import, "Read File" }
                button { class: "btn btn-secondary", onclick: on_template, "Download Template" }
            }
            if !skipped_rows.is_empty() {
                ul { class: "skipped-rows",
                    for row in skipped_rows {
                        li { key: "{row.line}", "Line {row.line}: {row.reason}" }
                    }
                }
            }
            form { class: "form-card", onsubmit: on_stage,
                TextArea {
                    label: "Question",
                    rows: 3,
                    value: question.read().text.clone(),
                    on_input: move |value| question.write().text = value,
                    error: field_error(&errors, "text"),
                }
                for (index, label) in OPTION_LABELS.into_iter().enumerate() {
                    TextField {
                        key: "{index}",
                        label,
                        value: question.read().options[index].clone(),
                        on_input: move |value| question.write().options[index] = value,
                    }
                }
                if let Some(message) = field_error(&errors, "options") {
                    span { class: "field-error", "{message}" }
                }
                TextField {
                    label: "Correct Answer",
                    value: question.read().correct_answer.clone(),
                    placeholder: "Option text, letter or number",
                    on_input: move |value| question.write().correct_answer = value,
                    error: field_error(&errors, "correct_answer"),
                }
                button { class: "btn", r#type: "submit", "Add to Batch" }
            }
            if staged.is_empty() {
                p { class: "empty", "No questions staged." }
            } else {
                ol { class: "staged-questions",
                    for (index, staged_question) in staged.iter().enumerate() {
                        li { key: "{index}",
                            span { "{staged_question.text}" }
                            span { class: "muted", " ({staged_question.correct_answer})" }
                            button {
                                class: "btn btn-small",
                                onclick: move |_| {
                                    batch.write().remove(index);
                                },
                                "Remove"
                            }
                        }
                    }
                }
            }
            button {
                class: "btn btn-primary",
                disabled: uploading() || staged.is_empty(),
                onclick: on_upload,
                if uploading() {
                    "Uploading..."
                } else {
                    "Upload {staged.len()} Questions"
                }
            }
        }
    }
}
