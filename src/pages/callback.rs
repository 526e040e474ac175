//! Callback route: the auth service returns here after sign-in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page renders only a spinner. `session::callback::complete_callback`
//! consumes the handshake parameters and names the next route, which
//! replaces `/callback` in history. Leaving the page aborts the exchange
//! together with its polling and fallback timers.

use leptos::prelude::*;

use crate::components::loading_screen::LoadingScreen;

#[component]
pub fn CallbackPage() -> impl IntoView {
    #[cfg(feature = "csr")]
    {
        use futures::future::{AbortHandle, Abortable};
        use leptos_router::NavigateOptions;
        use leptos_router::hooks::use_navigate;

        use crate::session::callback::complete_callback;
        use crate::session::timer::BrowserTimer;
        use crate::util::auth::use_session;

        let session = use_session();
        let navigate = use_navigate();
        let (abort, registration) = AbortHandle::new_pair();
        let exchange = Abortable::new(async move { complete_callback(&session, &BrowserTimer).await }, registration);

        leptos::task::spawn_local(async move {
            match exchange.await {
                Ok(outcome) => navigate(&outcome.destination, NavigateOptions { replace: true, ..Default::default() }),
                Err(_) => leptos::logging::log!("auth callback abandoned on unmount"),
            }
        });
        on_cleanup(move || abort.abort());
    }

    view! { <LoadingScreen message="Completing sign-in..."/> }
}
