use dioxus::prelude::*;
use olympiad_core::model::{DraftErrors, SalesPerson, SalesPersonDraft};
use services::ListState;

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};

#[component]
pub fn SalesTeamView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let sales = ctx.sales_team();

    let list = use_signal(ListState::<SalesPerson>::new);
    let banner = use_signal(|| None::<String>);
    let mut form_open = use_signal(|| false);
    let mut draft = use_signal(SalesPersonDraft::default);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);

    let mut loader = use_resource({
        let sales = sales.clone();
        move || {
            let sales = sales.clone();
            let mut list = list;
            async move {
                let viewer = session.current().ok_or(ViewError::Unknown)?;
                let ticket = list.write().begin_fetch();
                let rows = sales.list(&viewer).await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_register = {
        let sales = sales.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let sales = sales.clone();
            let submitted = draft();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                saving.set(true);
                let outcome = sales.register(&viewer, submitted).await;
                saving.set(false);
                match outcome {
                    Ok(person) => {
                        list.write().apply_created(person);
                        draft.set(SalesPersonDraft::default());
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

    let on_toggle = use_callback({
        let sales = sales.clone();
        move |person: SalesPerson| {
            let Some(viewer) = session.current() else {
                return;
            };
            let sales = sales.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                let next = person.status.toggled();
                match sales.set_status(&viewer, person.id, next).await {
                    Ok(status) => list.write().apply_updated(SalesPerson { status, ..person }),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    });

    let rows = list.read().items().to_vec();
    let loaded = list.read().is_loaded();
    let load_state = view_state_from_resource(&loader);

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Sales Team" }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| {
                        errors.set(None);
                        form_open.set(!form_open());
                    },
                    if form_open() { "Close" } else { "Add Sales Person" }
                }
            }
            Banner { message: banner }
            if form_open() {
                form { class: "card form-card", onsubmit: on_register,
                    h3 { "Register Sales Person" }
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
                        label: "Password",
                        kind: "password",
                        value: draft.read().password.clone(),
                        on_input: move |value| draft.write().password = value,
                        error: field_error(&errors, "password"),
                    }
                    div { class: "form-actions",
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Registering..." } else { "Register" }
                        }
                    }
                }
            }
            match load_state {
                ViewState::Error(error) if !loaded => rsx! {
                    ErrorPanel { error, on_retry: move |()| loader.restart() }
                },
                ViewState::Loading | ViewState::Idle if !loaded => rsx! {
                    p { class: "muted", "Loading sales team..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No sales people registered yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Email" }
                                    th { "Status" }
                                    th { "Actions" }
                                }
                            }
                            tbody {
                                for person in rows {
                                    SalesRow { key: "{person.id}", person: person.clone(), on_toggle }
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
fn SalesRow(person: SalesPerson, on_toggle: EventHandler<SalesPerson>) -> Element {
    let active = person.status.is_active();
    let status_class = if active { "status status-active" } else { "status status-inactive" };
    let target = person.clone();

    rsx! {
        tr {
            td { "{person.name}" }
            td { "{person.email}" }
            td { span { class: "{status_class}", "{person.status}" } }
            td { class: "actions",
                button {
                    class: "btn btn-small",
                    onclick: move |_| on_toggle.call(target.clone()),
                    if active { "Deactivate" } else { "Activate" }
                }
            }
        }
    }
}
