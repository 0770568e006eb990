use dioxus::prelude::*;
use services::{AuthError, DashboardError, LoadError};

/// Failure shown in place of a page's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    /// Banner text ready for display.
    Message(String),
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotFound => "Not found.".to_string(),
            Self::Message(message) => message.clone(),
            Self::Unknown => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<DashboardError> for ViewError {
    fn from(err: DashboardError) -> Self {
        Self::Message(err.user_message())
    }
}

impl From<LoadError> for ViewError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(_) => Self::NotFound,
            LoadError::Api(err) => Self::Message(format!("Failed to load the test: {}", err.user_message())),
            _ => Self::Unknown,
        }
    }
}

impl From<AuthError> for ViewError {
    fn from(err: AuthError) -> Self {
        Self::Message(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Error text with a "Try Again" button.
#[component]
pub fn ErrorPanel(error: ViewError, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "error-panel",
            p { class: "error", "{error.message()}" }
            button { class: "btn", onclick: move |_| on_retry.call(()), "Try Again" }
        }
    }
}

/// Dismissable banner for failed mutations.
#[component]
pub fn Banner(message: Signal<Option<String>>) -> Element {
    let mut message = message;
    let text = message.read().clone();
    rsx! {
        if let Some(text) = text {
            div { class: "banner banner-error", role: "alert",
                span { "{text}" }
                button {
                    class: "banner-close",
                    onclick: move |_| message.set(None),
                    "×"
                }
            }
        }
    }
}
