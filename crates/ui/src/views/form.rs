use dioxus::prelude::*;
use olympiad_core::model::DraftErrors;

/// Labelled input with an inline validation message.
#[component]
pub fn TextField(
    label: &'static str,
    value: String,
    on_input: EventHandler<String>,
    #[props(default)] error: Option<String>,
    #[props(default = "text")] kind: &'static str,
    #[props(default, into)] placeholder: String,
) -> Element {
    let class = if error.is_some() { "input input-invalid" } else { "input" };
    rsx! {
        label { class: "field",
            span { class: "field-label", "{label}" }
            input {
                class: "{class}",
                r#type: kind,
                value: "{value}",
                placeholder: "{placeholder}",
                oninput: move |evt| on_input.call(evt.value()),
            }
            if let Some(error) = error {
                span { class: "field-error", "{error}" }
            }
        }
    }
}

#[component]
pub fn TextArea(
    label: &'static str,
    value: String,
    on_input: EventHandler<String>,
    #[props(default)] error: Option<String>,
    #[props(default = 6)] rows: u32,
) -> Element {
    let class = if error.is_some() { "input input-invalid" } else { "input" };
    rsx! {
        label { class: "field",
            span { class: "field-label", "{label}" }
            textarea {
                class: "{class}",
                rows: "{rows}",
                value: "{value}",
                oninput: move |evt| on_input.call(evt.value()),
            }
            if let Some(error) = error {
                span { class: "field-error", "{error}" }
            }
        }
    }
}

/// Message for `field` from the last failed validation, if any.
#[must_use]
pub fn field_error(errors: &Signal<Option<DraftErrors>>, field: &str) -> Option<String> {
    errors
        .read()
        .as_ref()
        .and_then(|errors| errors.message_for(field))
        .map(str::to_string)
}

/// Yes/No prompt shown before destructive actions.
#[component]
pub fn ConfirmDialog(
    #[props(into)] message: String,
    confirm_label: &'static str,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                p { "{message}" }
                div { class: "modal-actions",
                    button { class: "btn", onclick: move |_| on_cancel.call(()), "Cancel" }
                    button {
                        class: "btn btn-danger",
                        onclick: move |_| on_confirm.call(()),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}

/// Whether the add/edit form is shown, and for which record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode<K> {
    Closed,
    Create,
    Edit(K),
}

impl<K> FormMode<K> {
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }
}
