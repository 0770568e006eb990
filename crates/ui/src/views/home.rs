use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::SessionHandle;
use crate::routes::Route;

/// `/` only redirects: to the role dashboard when signed in, else to login.
#[component]
pub fn HomeView() -> Element {
    let session = use_context::<SessionHandle>();
    let navigator = use_navigator();

    use_effect(move || {
        let target = session.role().map_or(Route::Login {}, Route::dashboard_for);
        navigator.replace(target);
    });

    rsx! {
        div { class: "page", p { "Loading..." } }
    }
}
