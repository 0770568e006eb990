use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use olympiad_core::model::{DraftErrors, RegistrationDraft, School, SchoolChoice};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::form::{TextField, field_error};
use crate::views::state::Banner;

const OTHER_SCHOOL: &str = "other";

/// Public student sign-up.
#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let users = ctx.users();
    let schools = ctx.schools();

    let mut draft = use_signal(RegistrationDraft::default);
    let errors = use_signal(|| None::<DraftErrors>);
    let banner = use_signal(|| None::<String>);
    let busy = use_signal(|| false);

    let directory = use_resource(move || {
        let schools = schools.clone();
        async move {
            match schools.active_directory().await {
                Ok(found) => found,
                Err(err) => {
                    warn!(error = %err, "school directory unavailable");
                    Vec::new()
                }
            }
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let users = users.clone();
        let submitted = draft();
        let (mut errors, mut banner, mut busy) = (errors, banner, busy);
        spawn(async move {
            busy.set(true);
            banner.set(None);
            let outcome = users.register(submitted).await;
            busy.set(false);
            match outcome {
                Ok(_) => {
                    errors.set(None);
                    navigator.replace(Route::Login {});
                }
                Err(err) => {
                    errors.set(err.field_errors().cloned());
                    banner.set(Some(err.user_message()));
                }
            }
        });
    };

    let listed: Vec<School> = directory.read().clone().unwrap_or_default();
    let picker_listed = listed.clone();
    let choice = draft.read().school.clone();
    let selected = match &choice {
        SchoolChoice::Unselected => String::new(),
        SchoolChoice::Listed { name, .. } => name.clone(),
        SchoolChoice::Other { .. } => OTHER_SCHOOL.to_string(),
    };
    let submit_label = if busy() { "Creating account..." } else { "Sign Up" };

    rsx! {
        div { class: "login-page",
            form { class: "card login-card", onsubmit: on_submit,
                h2 { "Create your account" }
                Banner { message: banner }
                TextField {
                    label: "Full Name",
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
                    label: "Class",
                    value: draft.read().user_class.clone(),
                    on_input: move |value| draft.write().user_class = value,
                    error: field_error(&errors, "user_class"),
                }
                label { class: "field",
                    span { class: "field-label", "School" }
                    select {
                        class: "input",
                        value: "{selected}",
                        onchange: move |evt| {
                            let picked = evt.value();
                            let next = if picked == OTHER_SCHOOL {
                                SchoolChoice::Other { name: String::new(), address: String::new() }
                            } else {
                                picker_listed
                                    .iter()
                                    .find(|school| school.name == picked)
                                    .map_or(SchoolChoice::Unselected, |school| SchoolChoice::Listed {
                                        name: school.name.clone(),
                                        address: school.address.clone(),
                                    })
                            };
                            draft.write().school = next;
                        },
                        option { value: "", "Select your school" }
                        for school in listed {
                            option { key: "{school.id}", value: "{school.name}", "{school.name}, {school.address}" }
                        }
                        option { value: OTHER_SCHOOL, "My school is not listed" }
                    }
                    if let Some(message) = field_error(&errors, "school") {
                        span { class: "field-error", "{message}" }
                    }
                }
                if let SchoolChoice::Other { name, address } = choice {
                    TextField {
                        label: "School Name",
                        value: name,
                        on_input: move |value| {
                            if let SchoolChoice::Other { name, .. } = &mut draft.write().school {
                                *name = value;
                            }
                        },
                    }
                    TextField {
                        label: "School Address",
                        value: address,
                        on_input: move |value| {
                            if let SchoolChoice::Other { address, .. } = &mut draft.write().school {
                                *address = value;
                            }
                        },
                    }
                }
                TextField {
                    label: "Password",
                    kind: "password",
                    value: draft.read().password.clone(),
                    on_input: move |value| draft.write().password = value,
                    error: field_error(&errors, "password"),
                }
                TextField {
                    label: "Confirm Password",
                    kind: "password",
                    value: draft.read().confirm_password.clone(),
                    on_input: move |value| draft.write().confirm_password = value,
                    error: field_error(&errors, "confirm_password"),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy(),
                    "{submit_label}"
                }
                p { class: "muted",
                    "Already registered? "
                    Link { to: Route::Login {}, "Log in" }
                }
            }
        }
    }
}
