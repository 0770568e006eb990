use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use olympiad_core::model::{DraftErrors, Persistence};
use services::AuthError;

use crate::context::{AppContext, SessionHandle};
use crate::routes::Route;
use crate::views::form::{TextField, field_error};
use crate::views::state::{Banner, ViewError};

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let navigator = use_navigator();

    let mut identifier = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut remember = use_signal(|| false);
    let errors = use_signal(|| None::<DraftErrors>);
    let banner = use_signal(|| None::<String>);
    let busy = use_signal(|| false);

    use_effect(move || {
        if let Some(role) = session.role() {
            navigator.replace(Route::dashboard_for(role));
        }
    });

    let auth = ctx.auth();
    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let auth = auth.clone();
        let identifier = identifier();
        let password = password();
        let persistence = if remember() {
            Persistence::Remember
        } else {
            Persistence::Session
        };
        let mut errors = errors;
        let mut banner = banner;
        let mut busy = busy;
        spawn(async move {
            busy.set(true);
            banner.set(None);
            let outcome = auth.login(&identifier, &password, persistence).await;
            busy.set(false);
            match outcome {
                Ok(user) => {
                    errors.set(None);
                    let role = user.role();
                    session.sign_in(user);
                    navigator.replace(Route::dashboard_for(role));
                }
                Err(AuthError::Invalid(found)) => errors.set(Some(found)),
                Err(err) => {
                    errors.set(None);
                    banner.set(Some(ViewError::from(err).message()));
                }
            }
        });
    };

    let submit_label = if busy() { "Signing in..." } else { "Login" };

    rsx! {
        div { class: "login-page",
            form { class: "card login-card", onsubmit: on_submit,
                h2 { "Welcome back" }
                p { class: "muted", "Sign in with your email or 10-digit phone number." }
                Banner { message: banner }
                TextField {
                    label: "Email or Phone",
                    value: identifier(),
                    on_input: move |value| identifier.set(value),
                    error: field_error(&errors, "identifier"),
                }
                TextField {
                    label: "Password",
                    kind: "password",
                    value: password(),
                    on_input: move |value| password.set(value),
                    error: field_error(&errors, "password"),
                }
                label { class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: remember(),
                        onchange: move |evt| remember.set(evt.checked()),
                    }
                    span { "Remember me" }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy(),
                    "{submit_label}"
                }
                p { class: "muted",
                    "New student? "
                    Link { to: Route::Register {}, "Create an account" }
                    " · "
                    Link { to: Route::Blogs {}, "Read the blog" }
                }
            }
        }
    }
}
