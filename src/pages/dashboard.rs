//! Dashboard page: the signed-in landing route.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the default destination after sign-in. It renders nothing
//! protected until the session has settled with a user; without one the
//! shared unauthenticated guard sends the browser to the auth service.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;

use crate::components::loading_screen::LoadingScreen;
use crate::net::types::User;
use crate::state::auth::AuthState;
use crate::util::auth::{SessionHandle, install_unauth_redirect};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    install_unauth_redirect(auth);

    let signing_out = RwSignal::new(false);
    let session = expect_context::<SessionHandle>();
    let on_sign_out = move |_| {
        if signing_out.get() {
            return;
        }
        signing_out.set(true);
        let session = session.get_value();
        leptos::task::spawn_local(async move {
            // Clearing the user lets the unauthenticated guard start a fresh sign-in.
            session.logout().await;
        });
    };

    view! {
        <Show
            when=move || shows_account(&auth.get())
            fallback=|| view! { <LoadingScreen/> }
        >
            <div class="dashboard-page">
                <header class="dashboard-header">
                    <h1>"QA Console"</h1>
                    <div class="dashboard-header__account">
                        {move || auth.get().user.as_ref().map(account_line)}
                        <button
                            class="dashboard-header__sign-out"
                            disabled=move || signing_out.get()
                            on:click=on_sign_out
                        >
                            "Sign out"
                        </button>
                    </div>
                </header>
            </div>
        </Show>
    }
}

/// Render account chrome whenever a user is known, including the cached user
/// shown while hydration is still running. Redirects belong to the guard.
fn shows_account(state: &AuthState) -> bool {
    state.user.is_some()
}

/// Account label for the header: name, and email when it adds information.
fn account_line(user: &User) -> String {
    let name = user.display_name();
    if user.email.is_empty() || user.email == name {
        name.to_owned()
    } else {
        format!("{name} <{}>", user.email)
    }
}
