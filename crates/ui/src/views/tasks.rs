use chrono::NaiveDate;
use dioxus::prelude::*;
use olympiad_core::model::{
    Capability, DraftErrors, SalesPerson, SalesPersonId, Task, TaskDraft, TaskFilter,
    TaskPriority, TaskStatus, TaskUpdate,
};
use services::ListState;

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{TextArea, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

/// Task board: admins assign and review, sales users work their own tasks.
#[component]
pub fn TasksView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let tasks = ctx.tasks();
    let sales_team = ctx.sales_team();

    let list = use_signal(ListState::<Task>::new);
    let mut filter = use_signal(TaskFilter::default);
    let banner = use_signal(|| None::<String>);
    let mut form_open = use_signal(|| false);
    let mut draft = use_signal(TaskDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);

    let viewer = session.current();
    let can_assign = viewer
        .as_ref()
        .is_some_and(|user| user.allows(Capability::AssignTasks));

    let mut loader = use_resource({
        let tasks = tasks.clone();
        move || {
            let tasks = tasks.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = tasks.list(&viewer).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    // Only admins pick an assignee; everyone else never fetches the team.
    let salesmen = use_resource(move || {
        let sales_team = sales_team.clone();
        async move {
            let Some(viewer) = session.current() else {
                return Vec::new();
            };
            if !viewer.allows(Capability::AssignTasks) {
                return Vec::new();
            }
            sales_team.list(&viewer).await.unwrap_or_default()
        }
    });

    let on_assign = {
        let tasks = tasks.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let tasks = tasks.clone();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = tasks.assign(&viewer, submitted).await;
                saving.set(false);
                match outcome {
                    Ok(task) => {
                        list.write().apply_created(task);
                        errors.set(None);
                        form_open.set(false);
                    }
                    Err(err) => {
                        errors.set(err.field_errors().cloned());
                        banner.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let on_update = use_callback({
        let tasks = tasks.clone();
        move |(task, update): (Task, TaskUpdate)| {
            let Some(viewer) = session.current() else {
                return;
            };
            let (mut list, mut banner) = (list, banner);
            match tasks.apply_update(&viewer, &task, &update) {
                Ok(next) => list.write().apply_updated(next),
                Err(err) => banner.set(Some(err.user_message())),
            }
        }
    });

    let today = tasks.today();
    let current_filter = filter();
    let rows: Vec<Task> = current_filter
        .apply(list.read().items())
        .into_iter()
        .cloned()
        .collect();
    let team: Vec<SalesPerson> = salesmen.read().clone().unwrap_or_default();
    let load_state = view_state_from_resource(&loader);
    let loaded = list.read().is_loaded();
    let status_value = current_filter.status.map_or("all", TaskStatus::as_str);

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { if can_assign { "Task Management" } else { "My Tasks" } }
                if can_assign {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| {
                            draft.set(TaskDraft::default());
                            errors.set(None);
                            form_open.set(true);
                        },
                        "Assign Task"
                    }
                }
            }
            Banner { message: banner }
            label { class: "field",
                span { class: "field-label", "Status" }
                select {
                    class: "input",
                    value: "{status_value}",
                    onchange: move |evt| filter.write().status = TaskStatus::parse(&evt.value()),
                    option { value: "all", "All" }
                    for status in TaskStatus::ALL {
                        option { key: "{status.as_str()}", value: "{status.as_str()}", "{status.label()}" }
                    }
                }
            }
            if can_assign && form_open() {
                form { class: "card form-card", onsubmit: on_assign,
                    h3 { "Assign Task" }
                    TextField {
                        label: "Title",
                        value: draft.read().title.clone(),
                        on_input: move |value| draft.write().title = value,
                        error: field_error(&errors, "title"),
                    }
                    TextArea {
                        label: "Description",
                        rows: 3,
                        value: draft.read().description.clone(),
                        on_input: move |value| draft.write().description = value,
                    }
                    label { class: "field",
                        span { class: "field-label", "Salesman" }
                        select {
                            class: "input",
                            onchange: move |evt| {
                                draft.write().assignee = evt.value().parse::<u64>().ok().map(SalesPersonId::new);
                            },
                            option { value: "", "Select a salesman" }
                            for person in team {
                                option { key: "{person.id}", value: "{person.id}", "{person.name} ({person.email})" }
                            }
                        }
                        if let Some(message) = field_error(&errors, "assignee") {
                            span { class: "field-error", "{message}" }
                        }
                    }
                    TextField {
                        label: "Due Date",
                        kind: "date",
                        value: draft.read().due_date.clone(),
                        on_input: move |value| draft.write().due_date = value,
                        error: field_error(&errors, "due_date"),
                    }
                    label { class: "field",
                        span { class: "field-label", "Priority" }
                        select {
                            class: "input",
                            value: "{draft.read().priority.as_str()}",
                            onchange: move |evt| {
                                if let Some(priority) = TaskPriority::parse(&evt.value()) {
                                    draft.write().priority = priority;
                                }
                            },
                            for priority in TaskPriority::ALL {
                                option { key: "{priority.as_str()}", value: "{priority.as_str()}", "{priority.label()}" }
                            }
                        }
                    }
                    TextField {
                        label: "School (optional)",
                        value: draft.read().school_name.clone(),
                        on_input: move |value| draft.write().school_name = value,
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
                            if saving() { "Assigning..." } else { "Assign" }
                        }
                    }
                }
            }
            match load_state {
                ViewState::Error(error) if !loaded => rsx! {
                    ErrorPanel { error, on_retry: move |()| loader.restart() }
                },
                ViewState::Loading | ViewState::Idle if !loaded => rsx! {
                    p { class: "muted", "Loading tasks..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No tasks found." }
                    } else {
                        div { class: "task-list",
                            for task in rows {
                                TaskCard {
                                    key: "{task.id}",
                                    task: task.clone(),
                                    today,
                                    can_prioritize: can_assign,
                                    on_update,
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn TaskCard(
    task: Task,
    today: NaiveDate,
    can_prioritize: bool,
    on_update: EventHandler<(Task, TaskUpdate)>,
) -> Element {
    let initial = TaskUpdate {
        status: task.status,
        priority: None,
        comment: String::new(),
    };
    let mut update = use_signal(move || initial);

    let overdue = task.is_overdue(today);
    let due = task
        .due_date
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_default();
    let priority = task.priority.unwrap_or_default();
    let shown_priority = update.read().priority.unwrap_or(priority);
    let target = task.clone();

    rsx! {
        article { class: if overdue { "card task-card task-overdue" } else { "card task-card" },
            header { class: "task-header",
                h3 { "{task.title}" }
                span { class: "badge priority-{priority.as_str()}", "{priority.label()}" }
                span { class: "badge status-{task.status.as_str()}", "{task.status.label()}" }
                if overdue {
                    span { class: "badge badge-overdue", "Overdue" }
                }
            }
            if !task.description.is_empty() {
                p { "{task.description}" }
            }
            p { class: "muted",
                "Assigned to {task.assigned_to.name} by {task.assigned_by}"
                if !due.is_empty() {
                    " · due {due}"
                }
            }
            if let Some(school) = task.school_name.clone() {
                p { class: "muted", "School: {school}" }
            }
            if !task.comments.is_empty() {
                ul { class: "task-comments",
                    for (index, comment) in task.comments.iter().enumerate() {
                        li { key: "{index}",
                            strong { "{comment.author}" }
                            span { class: "muted", " {comment.posted_at}" }
                            p { "{comment.text}" }
                        }
                    }
                }
            }
            div { class: "task-update",
                select {
                    class: "input",
                    value: "{update.read().status.as_str()}",
                    onchange: move |evt| update.write().status = TaskStatus::parse(&evt.value()).unwrap_or_default(),
                    for status in TaskStatus::ALL {
                        option { key: "{status.as_str()}", value: "{status.as_str()}", "{status.label()}" }
                    }
                }
                if can_prioritize {
                    select {
                        class: "input",
                        value: "{shown_priority.as_str()}",
                        onchange: move |evt| update.write().priority = TaskPriority::parse(&evt.value()),
                        for option_priority in TaskPriority::ALL {
                            option { key: "{option_priority.as_str()}", value: "{option_priority.as_str()}", "{option_priority.label()}" }
                        }
                    }
                }
                TextArea {
                    label: "Comment",
                    rows: 2,
                    value: update.read().comment.clone(),
                    on_input: move |value| update.write().comment = value,
                }
                button {
                    class: "btn btn-primary btn-small",
                    onclick: move |_| {
                        on_update.call((target.clone(), update()));
                        update.write().comment.clear();
                    },
                    "Update"
                }
            }
        }
    }
}
