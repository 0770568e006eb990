use dioxus::prelude::*;
use olympiad_core::model::{Capability, DraftErrors, School, SchoolDraft, SchoolId};
use services::ListState;

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{ConfirmDialog, FormMode, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

/// School registrations, shared by the admin and sales dashboards.
#[component]
pub fn SchoolsView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let schools = ctx.schools();

    let list = use_signal(ListState::<School>::new);
    let mut search = use_signal(String::new);
    let banner = use_signal(|| None::<String>);
    let mut mode = use_signal(|| FormMode::<SchoolId>::Closed);
    let mut draft = use_signal(SchoolDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<School>);

    let mut loader = use_resource({
        let schools = schools.clone();
        move || {
            let schools = schools.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = schools.list(&viewer, false).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_save = {
        let schools = schools.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let schools = schools.clone();
            let target = mode();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = match &target {
                    FormMode::Edit(id) => schools.update(&viewer, id, submitted).await,
                    _ => schools.create(&viewer, submitted).await,
                };
                saving.set(false);
                match outcome {
                    Ok(school) if target.is_edit() => {
                        list.write().apply_updated(school);
                        errors.set(None);
                        mode.set(FormMode::Closed);
                    }
                    Ok(school) => {
                        list.write().apply_created(school);
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

    let on_toggle = use_callback({
        let schools = schools.clone();
        move |id: SchoolId| {
            let Some(viewer) = session.current() else {
                return;
            };
            let schools = schools.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match schools.toggle_status(&viewer, &id).await {
                    Ok(school) => list.write().apply_updated(school),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    });

    let on_confirm_delete = {
        let schools = schools.clone();
        move |()| {
            let Some(school) = pending_delete.take() else {
                return;
            };
            let Some(viewer) = session.current() else {
                return;
            };
            let schools = schools.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match schools.remove(&viewer, &school.id).await {
                    Ok(()) => list.write().apply_removed(&school.id),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    };

    let viewer = session.current();
    let can_manage = viewer
        .as_ref()
        .is_some_and(|user| user.allows(Capability::ManageSchools));
    let can_delete = viewer
        .as_ref()
        .is_some_and(|user| user.allows(Capability::DeleteSchools));

    let term = search();
    let rows: Vec<School> = list
        .read()
        .items()
        .iter()
        .filter(|school| school.matches(&term))
        .cloned()
        .collect();
    let load_state = view_state_from_resource(&loader);
    let loaded = list.read().is_loaded();

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Schools" }
                if can_manage {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| {
                            draft.set(SchoolDraft::default());
                            errors.set(None);
                            mode.set(FormMode::Create);
                        },
                        "Add School"
                    }
                }
            }
            Banner { message: banner }
            input {
                class: "input search",
                r#type: "search",
                placeholder: "Search schools...",
                value: "{term}",
                oninput: move |evt| search.set(evt.value()),
            }
            if mode.read().is_open() {
                form { class: "card form-card", onsubmit: on_save,
                    h3 { if mode.read().is_edit() { "Edit School" } else { "Register School" } }
                    TextField {
                        label: "School Name",
                        value: draft.read().name.clone(),
                        on_input: move |value| draft.write().name = value,
                        error: field_error(&errors, "name"),
                    }
                    TextField {
                        label: "Address",
                        value: draft.read().address.clone(),
                        on_input: move |value| draft.write().address = value,
                        error: field_error(&errors, "address"),
                    }
                    TextField {
                        label: "Email",
                        kind: "email",
                        value: draft.read().email.clone(),
                        on_input: move |value| draft.write().email = value,
                        error: field_error(&errors, "email"),
                    }
                    TextField {
                        label: "Admin Name",
                        value: draft.read().admin_name.clone(),
                        on_input: move |value| draft.write().admin_name = value,
                        error: field_error(&errors, "admin_name"),
                    }
                    TextField {
                        label: "Phone",
                        kind: "tel",
                        value: draft.read().phone.clone(),
                        on_input: move |value| draft.write().phone = value,
                        error: field_error(&errors, "phone"),
                    }
                    TextField {
                        label: "City",
                        value: draft.read().city.clone(),
                        on_input: move |value| draft.write().city = value,
                    }
                    TextField {
                        label: "State",
                        value: draft.read().state.clone(),
                        on_input: move |value| draft.write().state = value,
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
                    p { class: "muted", "Loading schools..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No schools found." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Admin" }
                                    th { "Email" }
                                    th { "Phone" }
                                    th { "City" }
                                    th { "Status" }
                                    th { "Actions" }
                                }
                            }
                            tbody {
                                for school in rows {
                                    SchoolRow {
                                        key: "{school.id}",
                                        school: school.clone(),
                                        can_manage,
                                        can_delete,
                                        on_edit: move |school: School| {
                                            draft.set(school.to_draft());
                                            errors.set(None);
                                            mode.set(FormMode::Edit(school.id));
                                        },
                                        on_toggle,
                                        on_delete: move |school: School| pending_delete.set(Some(school)),
                                    }
                                }
                            }
                        }
                    }
                },
            }
            if let Some(school) = pending_delete.read().clone() {
                ConfirmDialog {
                    message: format!("Delete {}? This cannot be undone.", school.name),
                    confirm_label: "Delete",
                    on_confirm: on_confirm_delete,
                    on_cancel: move |()| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn SchoolRow(
    school: School,
    can_manage: bool,
    can_delete: bool,
    on_edit: EventHandler<School>,
    on_toggle: EventHandler<SchoolId>,
    on_delete: EventHandler<School>,
) -> Element {
    let status_class = if school.status.is_active() {
        "status status-active"
    } else {
        "status status-inactive"
    };
    let toggle_label = if school.status.is_active() {
        "Deactivate"
    } else {
        "Activate"
    };
    let city = school.city.clone().unwrap_or_default();
    let edit_target = school.clone();
    let delete_target = school.clone();
    let toggle_id = school.id.clone();

    rsx! {
        tr {
            td { "{school.name}" }
            td { "{school.admin_name}" }
            td { "{school.email}" }
            td { "{school.phone}" }
            td { "{city}" }
            td { span { class: "{status_class}", "{school.status}" } }
            td { class: "actions",
                if can_manage {
                    button { class: "btn btn-small", onclick: move |_| on_edit.call(edit_target.clone()), "Edit" }
                    button {
                        class: "btn btn-small",
                        onclick: move |_| on_toggle.call(toggle_id.clone()),
                        "{toggle_label}"
                    }
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
