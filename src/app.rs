//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::AuthConfig;
use crate::pages::{callback::CallbackPage, dashboard::DashboardPage};
use crate::session::SessionManager;
use crate::util::auth::provide_session;

/// Root application component.
///
/// Builds the tab's `SessionManager`, mirrors its state into an
/// `RwSignal<AuthState>` context, and hydrates the session in the background.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = AuthConfig::from_browser().unwrap_or_else(|| AuthConfig::from_location("http:", "localhost"));
    let session = SessionManager::browser(config);

    // Cached user is visible immediately; `loading` stays set until hydrate settles.
    let auth = RwSignal::new(session.init());
    session.subscribe(move |state| auth.set(state.clone()));
    provide_context(auth);

    let handle = provide_session(session);

    #[cfg(feature = "csr")]
    {
        let session = handle.get_value();
        leptos::task::spawn_local(async move {
            session.hydrate().await;
        });
    }
    on_cleanup(move || handle.with_value(SessionManager::dispose));

    view! {
        <Title text="QA Console"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("callback") view=CallbackPage/>
                <Route path=StaticSegment("dashboard") view=DashboardPage/>
                <Route path=StaticSegment("") view=DashboardPage/>
            </Routes>
        </Router>
    }
}
