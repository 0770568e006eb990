use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{DesktopContext, WindowCloseBehaviour, use_wry_event_handler, window};
use dioxus::prelude::*;
use dioxus_router::Router;

use crate::context::{AppContext, ExamLock, use_exam_lock_provider, use_session_provider};
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    use_session_provider(&ctx);
    use_exam_lock_provider();
    let on_desktop = use_hook(|| try_consume_context::<DesktopContext>().is_some());

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Olympiad" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
            if on_desktop {
                CloseGuard {}
            }
        }
    }
}

/// Keeps the window open while a mock test is running.
#[component]
fn CloseGuard() -> Element {
    let lock = use_context::<ExamLock>();
    let desktop = use_hook(window);
    let mut blocked = use_signal(|| false);

    use_effect({
        let desktop = desktop.clone();
        move || {
            let behaviour = if lock.is_locked() {
                WindowCloseBehaviour::LastWindowHides
            } else {
                WindowCloseBehaviour::LastWindowExitsApp
            };
            desktop.set_close_behavior(behaviour);
        }
    });

    use_wry_event_handler(move |event, _| {
        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            if lock.is_locked() {
                tracing::info!("window close held back during a mock test");
                blocked.set(true);
            }
        }
    });

    use_effect(move || {
        if blocked() {
            desktop.set_visible(true);
            desktop.set_focus();
        }
    });

    if !blocked() {
        return rsx! {};
    }

    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "alertdialog",
                p { "Your test is in progress. Submit it before closing the window." }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| blocked.set(false),
                    "Back to the test"
                }
            }
        }
    }
}
