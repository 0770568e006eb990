use std::time::Duration;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use olympiad_core::model::{MatchSetId, QuestionStatus};
use services::{MockTestSession, Phase, SessionEffect, SubmitSummary, TickOutcome};
use tracing::warn;

use super::scripts::{effect_script, unload_guard_script};
use crate::context::{AppContext, ExamLock, SessionHandle};
use crate::routes::Route;
use crate::views::state::{ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::{PaletteItemVm, QuestionVm, SessionHeaderVm, header_vm, palette, question_vm};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MockTestIntent {
    Start,
    Select(usize),
    Clear,
    ToggleReview,
    GoTo(usize),
    Next,
    Previous,
}

const LEGEND: [QuestionStatus; 5] = [
    QuestionStatus::Answered,
    QuestionStatus::NotAnswered,
    QuestionStatus::Marked,
    QuestionStatus::AnsweredAndMarked,
    QuestionStatus::NotVisited,
];

fn legend() -> Vec<(&'static str, &'static str)> {
    LEGEND
        .iter()
        .map(|status| (status.css_class(), status.label()))
        .collect()
}

fn run_effect(effect: SessionEffect) {
    let _ = eval(effect_script(effect));
}

/// A loaded attempt handed to `ExamRunner`. Two are equal when they hold the
/// same exam for the same student.
#[derive(Clone)]
pub struct LoadedAttempt(pub MockTestSession);

impl PartialEq for LoadedAttempt {
    fn eq(&self, other: &Self) -> bool {
        self.0.exam_id() == other.0.exam_id() && self.0.student() == other.0.student()
    }
}

#[component]
pub fn MockTestView(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let exam_id = MatchSetId::new(id);
    let mock_tests = ctx.mock_tests();

    let mut resource = use_resource(move || {
        let mock_tests = mock_tests.clone();
        async move {
            let student = session.current().ok_or(ViewError::Unknown)?.id();
            let loaded = mock_tests.load(exam_id, student).await?;
            Ok::<_, ViewError>(LoadedAttempt(loaded))
        }
    });

    let body = match view_state_from_resource(&resource) {
        ViewState::Error(ViewError::NotFound) => rsx! {
            div { class: "error-panel",
                p { class: "error", "This mock test does not exist." }
                Link { class: "btn", to: Route::MockTests {}, "Back to Mock Tests" }
            }
        },
        ViewState::Error(error) => rsx! {
            ErrorPanel { error, on_retry: move |()| resource.restart() }
        },
        ViewState::Ready(loaded) => rsx! {
            ExamRunner { key: "{id}", loaded }
        },
        ViewState::Loading | ViewState::Idle => rsx! {
            p { class: "muted", "Loading test..." }
        },
    };

    rsx! {
        div { class: "page mock-test-page", id: "mock-test-root", {body} }
    }
}

/// Drives one attempt: answers, countdown, submission and the exam lock.
#[component]
pub fn ExamRunner(loaded: LoadedAttempt) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let exam_lock = use_hook(try_consume_context::<ExamLock>);
    let mock_tests = ctx.mock_tests();
    let exam_id = loaded.0.exam_id();
    let id = exam_id.value();

    let attempt = use_signal(move || Some(loaded.0));
    let mut confirm_open = use_signal(|| false);

    let dispatch = use_callback({
        let mock_tests = mock_tests.clone();
        move |intent: MockTestIntent| {
            let mut attempt = attempt;
            let mock_tests = mock_tests.clone();

            if intent == MockTestIntent::Start {
                spawn(async move {
                    let taken = attempt.write().take();
                    let Some(mut current) = taken else {
                        return;
                    };
                    let started = mock_tests.start(&mut current).await;
                    attempt.set(Some(current));
                    match started {
                        Ok(effect) => run_effect(effect),
                        Err(err) => warn!(%exam_id, error = %err, "mock test did not start"),
                    }
                });
                return;
            }

            let progress = {
                let mut guard = attempt.write();
                let Some(current) = guard.as_mut() else {
                    return;
                };
                let index = current.current_index();
                let applied = match intent {
                    MockTestIntent::Select(option) => current.select_answer(index, option),
                    MockTestIntent::Clear => current.clear_answer(index),
                    MockTestIntent::ToggleReview => current.toggle_review(index).map(|_| ()),
                    MockTestIntent::GoTo(target) => current.go_to(target),
                    MockTestIntent::Next => current.next(),
                    MockTestIntent::Previous => current.previous(),
                    MockTestIntent::Start => Ok(()),
                };
                if let Err(err) = applied {
                    warn!(%exam_id, ?intent, error = %err, "mock test action rejected");
                    return;
                }
                current.progress()
            };
            spawn(async move {
                mock_tests.persist(exam_id, &progress).await;
            });
        }
    });

    let submit = use_callback({
        let mock_tests = mock_tests.clone();
        move |()| {
            let mut attempt = attempt;
            let begun = {
                let mut guard = attempt.write();
                let Some(current) = guard.as_mut() else {
                    return;
                };
                current.begin_submit()
            };
            let request = match begun {
                Ok(request) => request,
                Err(err) => {
                    warn!(%exam_id, error = %err, "submit ignored");
                    return;
                }
            };
            confirm_open.set(false);
            let mock_tests = mock_tests.clone();
            spawn(async move {
                match mock_tests.send(&request).await {
                    Ok(done) => {
                        let finished = attempt
                            .write()
                            .as_mut()
                            .map(|current| current.complete_submit(done.result.clone()));
                        match finished {
                            Some(Ok(effect)) => run_effect(effect),
                            Some(Err(err)) => warn!(%exam_id, error = %err, "late submission result"),
                            None => {}
                        }
                        navigator.replace(Route::MockTestResult {
                            id: request.exam_id.value(),
                        });
                    }
                    Err(err) => {
                        if let Some(current) = attempt.write().as_mut() {
                            current.fail_submit(err.user_message());
                        }
                    }
                }
            });
        }
    });

    // One-second countdown; runs for the lifetime of the view and only ticks in progress.
    use_future(move || async move {
        let mut attempt = attempt;
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let running = attempt
                .peek()
                .as_ref()
                .is_some_and(|current| current.phase() == Phase::InProgress);
            if !running {
                continue;
            }
            let outcome = attempt
                .write()
                .as_mut()
                .map_or(TickOutcome::Idle, MockTestSession::tick);
            if outcome == TickOutcome::Expired {
                submit.call(());
            }
        }
    });

    use_effect(move || {
        let active = attempt
            .read()
            .as_ref()
            .is_some_and(MockTestSession::guards_unload);
        if let Some(lock) = exam_lock {
            lock.set(active);
        }
        let _ = eval(unload_guard_script(active));
    });

    use_drop(move || {
        if let Some(lock) = exam_lock {
            lock.set(false);
        }
    });

    let snapshot = attempt.read().clone();
    let Some(current) = snapshot else {
        return rsx! {
            p { class: "muted", "Loading test..." }
        };
    };

    match current.phase() {
        Phase::Instructions => rsx! {
            Instructions {
                title: current.exam().title().to_string(),
                subject: current.exam().subject().to_string(),
                minutes: current.exam().duration_seconds() / 60,
                questions: current.exam().question_count(),
                lines: current.exam().instructions().to_vec(),
                restored: current.was_restored(),
                on_start: move |()| dispatch.call(MockTestIntent::Start),
            }
        },
        Phase::Submitted => rsx! {
            div { class: "card",
                p { "Your answers have been submitted." }
                Link { class: "btn btn-primary", to: Route::MockTestResult { id }, "View Result" }
            }
        },
        phase => {
            let header = header_vm(&current);
            let question = question_vm(&current);
            let items = palette(&current);
            let summary = current.submit_summary();
            let submit_error = current.submit_error().map(str::to_string);
            let busy = phase != Phase::InProgress;
            rsx! {
                ExamHeader { header }
                if let Some(message) = submit_error {
                    div { class: "banner banner-error", role: "alert",
                        span { "{message}" }
                    }
                }
                div { class: "exam-layout",
                    if let Some(question) = question {
                        QuestionPanel {
                            question,
                            disabled: busy,
                            on_intent: dispatch,
                            on_submit: move |()| confirm_open.set(true),
                        }
                    }
                    Palette { items, disabled: busy, on_intent: dispatch }
                }
                if confirm_open() && !busy {
                    SubmitDialog {
                        summary,
                        on_confirm: submit,
                        on_cancel: move |()| confirm_open.set(false),
                    }
                }
                if busy {
                    div { class: "modal-backdrop",
                        div { class: "modal",
                            if phase == Phase::AutoSubmitting {
                                p { "Time is up! Submitting your answers..." }
                            } else {
                                p { "Submitting your answers..." }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Instructions(
    title: String,
    subject: String,
    minutes: u32,
    questions: usize,
    lines: Vec<String>,
    restored: bool,
    on_start: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "card instructions",
            h2 { "{title}" }
            p { class: "muted", "{subject} · {questions} questions · {minutes} minutes" }
            if restored {
                p { class: "notice", "Your previous answers were restored. The timer restarts when you begin." }
            }
            h3 { "Instructions" }
            ol {
                for line in lines {
                    li { "{line}" }
                }
            }
            button { class: "btn btn-primary", onclick: move |_| on_start.call(()), "Start Test" }
        }
    }
}

#[component]
fn ExamHeader(header: SessionHeaderVm) -> Element {
    let timer_class = if header.low_time { "timer timer-low" } else { "timer" };
    rsx! {
        header { class: "exam-header",
            div {
                h2 { "{header.title}" }
                p { class: "muted", "{header.subject}" }
            }
            div { class: "exam-progress",
                span { "{header.answered}/{header.total} answered" }
                div { class: "progress-bar",
                    div { class: "progress-fill", style: "width: {header.progress_percent}%" }
                }
            }
            span { class: "{timer_class}", id: "mock-test-timer", "{header.timer}" }
        }
    }
}

#[component]
fn QuestionPanel(
    question: QuestionVm,
    disabled: bool,
    on_intent: EventHandler<MockTestIntent>,
    on_submit: EventHandler<()>,
) -> Element {
    let review_label = if question.marked { "Unmark Review" } else { "Mark for Review" };
    rsx! {
        section { class: "card question-card",
            p { class: "muted", "Question {question.number} of {question.total}" }
            h3 { class: "question-text", "{question.text}" }
            div { class: "options",
                for option in question.options {
                    button {
                        key: "{option.index}",
                        class: if option.selected { "option option-selected" } else { "option" },
                        disabled: disabled,
                        onclick: move |_| on_intent.call(MockTestIntent::Select(option.index)),
                        span { class: "option-letter", "{option.letter}" }
                        span { "{option.text}" }
                    }
                }
            }
            div { class: "question-actions",
                button {
                    class: "btn",
                    disabled: disabled || question.is_first,
                    onclick: move |_| on_intent.call(MockTestIntent::Previous),
                    "Previous"
                }
                button {
                    class: "btn",
                    disabled: disabled,
                    onclick: move |_| on_intent.call(MockTestIntent::Clear),
                    "Clear Response"
                }
                button {
                    class: "btn btn-review",
                    disabled: disabled,
                    onclick: move |_| on_intent.call(MockTestIntent::ToggleReview),
                    "{review_label}"
                }
                if question.is_last {
                    button {
                        class: "btn btn-primary",
                        disabled: disabled,
                        onclick: move |_| on_submit.call(()),
                        "Submit Test"
                    }
                } else {
                    button {
                        class: "btn btn-primary",
                        disabled: disabled,
                        onclick: move |_| on_intent.call(MockTestIntent::Next),
                        "Save & Next"
                    }
                }
            }
        }
    }
}

#[component]
fn Palette(
    items: Vec<PaletteItemVm>,
    disabled: bool,
    on_intent: EventHandler<MockTestIntent>,
) -> Element {
    rsx! {
        aside { class: "card palette",
            h3 { "Questions" }
            div { class: "palette-grid",
                for item in items {
                    button {
                        key: "{item.index}",
                        class: "palette-item {item.class}",
                        class: if item.current { "current" },
                        title: item.title,
                        disabled: disabled,
                        onclick: move |_| on_intent.call(MockTestIntent::GoTo(item.index)),
                        "{item.number}"
                    }
                }
            }
            ul { class: "legend",
                for (class, label) in legend() {
                    li {
                        span { class: "legend-swatch {class}" }
                        "{label}"
                    }
                }
            }
        }
    }
}

#[component]
fn SubmitDialog(
    summary: SubmitSummary,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                h3 { "Submit Test?" }
                table { class: "summary-table",
                    tbody {
                        tr { td { "Answered" } td { "{summary.answered}" } }
                        tr { td { "Not Answered" } td { "{summary.not_answered}" } }
                        tr { td { "Marked for Review" } td { "{summary.marked}" } }
                    }
                }
                p { class: "muted", "You cannot change your answers after submitting." }
                div { class: "modal-actions",
                    button { class: "btn", onclick: move |_| on_cancel.call(()), "Keep Working" }
                    button { class: "btn btn-primary", onclick: move |_| on_confirm.call(()), "Submit" }
                }
            }
        }
    }
}
