use dioxus::prelude::*;
use olympiad_core::model::{
    Capability, DraftErrors, NewUserDraft, UserAccount, UserFilter, UserId, UserUpdate,
};
use services::{ListState, USER_CSV_FILE_NAME, UserService};
use tracing::{info, warn};

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{ConfirmDialog, FormMode, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

fn edit_draft(user: &UserAccount) -> NewUserDraft {
    let update = user.to_update();
    NewUserDraft {
        name: update.name,
        email: update.email,
        phone: update.phone,
        school: update.school,
        user_class: update.user_class,
        password: String::new(),
    }
}

fn as_update(draft: NewUserDraft) -> UserUpdate {
    UserUpdate {
        name: draft.name,
        email: draft.email,
        phone: draft.phone,
        school: draft.school,
        user_class: draft.user_class,
    }
}

fn choice(raw: String) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw) }
}

/// Student accounts; admins manage everyone, schools edit their own students.
#[component]
pub fn UsersView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let users = ctx.users();

    let list = use_signal(ListState::<UserAccount>::new);
    let mut filter = use_signal(UserFilter::default);
    let banner = use_signal(|| None::<String>);
    let notice = use_signal(|| None::<String>);
    let mut mode = use_signal(|| FormMode::<UserId>::Closed);
    let mut draft = use_signal(NewUserDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<UserAccount>);

    let mut loader = use_resource({
        let users = users.clone();
        move || {
            let users = users.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = users.list(&viewer).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_save = {
        let users = users.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let users = users.clone();
            let target = mode();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = match &target {
                    FormMode::Edit(id) => users.update(&viewer, *id, as_update(submitted)).await,
                    _ => users.create(&viewer, submitted).await,
                };
                saving.set(false);
                match outcome {
                    Ok(user) => {
                        if target.is_edit() {
                            list.write().apply_updated(user);
                        } else {
                            list.write().apply_created(user);
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

    let on_confirm_delete = {
        let users = users.clone();
        move |()| {
            let Some(user) = pending_delete.take() else {
                return;
            };
            let Some(viewer) = session.current() else {
                return;
            };
            let users = users.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match users.remove(&viewer, user.id).await {
                    Ok(()) => list.write().apply_removed(&user.id),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    };

    let current_filter = filter();
    let all_rows = list.read().items().to_vec();
    let rows: Vec<UserAccount> = current_filter
        .apply(&all_rows)
        .into_iter()
        .cloned()
        .collect();
    let class_options = UserFilter::class_options(&all_rows);
    let school_options = UserFilter::school_options(&all_rows);

    let on_export = {
        let rows = rows.clone();
        move |_| {
            let (mut banner, mut notice) = (banner, notice);
            let csv = match UserService::export_csv(&rows) {
                Ok(csv) => csv,
                Err(err) => {
                    banner.set(Some(err.user_message()));
                    return;
                }
            };
            let count = rows.len();
            spawn(async move {
                match tokio::fs::write(USER_CSV_FILE_NAME, csv).await {
                    Ok(()) => {
                        info!(rows = count, file = USER_CSV_FILE_NAME, "users exported");
                        notice.set(Some(format!("Exported {count} users to {USER_CSV_FILE_NAME}")));
                    }
                    Err(err) => {
                        warn!(error = %err, "user export failed");
                        banner.set(Some(format!("Export failed: {err}")));
                    }
                }
            });
        }
    };

    let viewer = session.current();
    let allows = |capability| viewer.as_ref().is_some_and(|user| user.allows(capability));
    let can_add = allows(Capability::AddUsers);
    let can_edit = allows(Capability::EditUsers);
    let can_delete = allows(Capability::DeleteUsers);

    let (shown, total) = (rows.len(), all_rows.len());
    let loaded = list.read().is_loaded();
    let load_state = view_state_from_resource(&loader);
    let creating = matches!(*mode.read(), FormMode::Create);

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Users" }
                div { class: "header-actions",
                    button { class: "btn", disabled: rows.is_empty(), onclick: on_export, "Export CSV" }
                    if can_add {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| {
                                draft.set(NewUserDraft::default());
                                errors.set(None);
                                mode.set(FormMode::Create);
                            },
                            "Add User"
                        }
                    }
                }
            }
            Banner { message: banner }
            if let Some(text) = notice() {
                p { class: "notice", "{text}" }
            }
            div { class: "filters",
                input {
                    class: "input search",
                    r#type: "search",
                    placeholder: "Search by name, email, code or school...",
                    value: "{current_filter.search}",
                    oninput: move |evt| filter.write().search = evt.value(),
                }
                select {
                    class: "input",
                    onchange: move |evt| filter.write().user_class = choice(evt.value()),
                    option { value: "", "All Classes" }
                    for class in class_options {
                        option {
                            value: "{class}",
                            selected: current_filter.user_class.as_deref() == Some(class.as_str()),
                            "{class}"
                        }
                    }
                }
                select {
                    class: "input",
                    onchange: move |evt| filter.write().school = choice(evt.value()),
                    option { value: "", "All Schools" }
                    for school in school_options {
                        option {
                            value: "{school}",
                            selected: current_filter.school.as_deref() == Some(school.as_str()),
                            "{school}"
                        }
                    }
                }
            }
            if mode.read().is_open() {
                form { class: "card form-card", onsubmit: on_save,
                    h3 { if creating { "Add User" } else { "Edit User" } }
                    TextField {
                        label: "Name",
                        value: draft.read().name.clone(),
                        on_input: move |value| draft.write().name = value,
                        error: field_error(&errors, "name"),
                    }
                    TextField {
                        label: "Email",
                        kind: "email",
                        value: draft.read().email.clone(),
                        on_input: move |value| draft.write().email = value,
                        error: field_error(&errors, "email"),
                    }
                    TextField {
                        label: "Phone",
                        kind: "tel",
                        value: draft.read().phone.clone(),
                        on_input: move |value| draft.write().phone = value,
                        error: field_error(&errors, "phone"),
                    }
                    TextField {
                        label: "School",
                        value: draft.read().school.clone(),
                        on_input: move |value| draft.write().school = value,
                    }
                    TextField {
                        label: "Class",
                        value: draft.read().user_class.clone(),
                        on_input: move |value| draft.write().user_class = value,
                    }
                    if creating {
                        TextField {
                            label: "Password",
                            kind: "password",
                            value: draft.read().password.clone(),
                            on_input: move |value| draft.write().password = value,
                            error: field_error(&errors, "password"),
                        }
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
                    p { class: "muted", "Loading users..." }
                },
                _ => rsx! {
                    p { class: "muted", "Showing {shown} of {total} users" }
                    if rows.is_empty() {
                        p { class: "empty", "No users match the current filters." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "User ID" }
                                    th { "Name" }
                                    th { "Email" }
                                    th { "Phone" }
                                    th { "School" }
                                    th { "Class" }
                                    th { "Exams" }
                                    if can_edit || can_delete {
                                        th { "Actions" }
                                    }
                                }
                            }
                            tbody {
                                for user in rows.iter() {
                                    UserRow {
                                        key: "{user.id}",
                                        user: user.clone(),
                                        can_edit,
                                        can_delete,
                                        on_edit: move |user: UserAccount| {
                                            draft.set(edit_draft(&user));
                                            errors.set(None);
                                            mode.set(FormMode::Edit(user.id));
                                        },
                                        on_delete: move |user: UserAccount| pending_delete.set(Some(user)),
                                    }
                                }
                            }
                        }
                    }
                },
            }
            if let Some(user) = pending_delete.read().clone() {
                ConfirmDialog {
                    message: format!("Delete {}? This cannot be undone.", user.name),
                    confirm_label: "Delete",
                    on_confirm: on_confirm_delete,
                    on_cancel: move |()| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn UserRow(
    user: UserAccount,
    can_edit: bool,
    can_delete: bool,
    on_edit: EventHandler<UserAccount>,
    on_delete: EventHandler<UserAccount>,
) -> Element {
    let phone = user.phone.clone().unwrap_or_default();
    let school = user.school.clone().unwrap_or_default();
    let class = user.user_class.clone().unwrap_or_default();
    let exams = user.registered_exams.len();
    let edit_target = user.clone();
    let delete_target = user.clone();

    rsx! {
        tr {
            td { "{user.user_code}" }
            td { "{user.name}" }
            td { "{user.email}" }
            td { "{phone}" }
            td { "{school}" }
            td { "{class}" }
            td { "{exams}" }
            if can_edit || can_delete {
                td { class: "actions",
                    if can_edit {
                        button { class: "btn btn-small", onclick: move |_| on_edit.call(edit_target.clone()), "Edit" }
                    }
                    if can_delete {
                        button {
                            class: "btn btn-small btn-danger",
                            onclick: move |_| on_delete.call(delete_target.clone()),
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}
