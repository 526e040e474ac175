//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes apply identical unauthenticated redirect behavior, and
//! every component reaches the one `SessionManager` through context.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;

use crate::session::SessionManager;
use crate::state::auth::AuthState;

/// Context handle for the tab's `SessionManager`.
pub type SessionHandle = StoredValue<SessionManager, LocalStorage>;

/// Routes that take part in sign-in and must never trigger another redirect.
const AUTH_SCREEN_PREFIXES: &[&str] = &["/login", "/auth"];

/// Whether `path` is the callback route or another sign-in screen.
pub fn is_auth_screen(path: &str, callback_path: &str) -> bool {
    path == callback_path
        || AUTH_SCREEN_PREFIXES
            .iter()
            .any(|prefix| path == *prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')))
}

/// Redirect once hydration finished without a user.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

/// Register `session` for [`use_session`].
pub fn provide_session(session: SessionManager) -> SessionHandle {
    let handle = StoredValue::new_local(session);
    provide_context(handle);
    handle
}

/// The tab's `SessionManager`. Panics if no ancestor called [`provide_session`].
pub fn use_session() -> SessionManager {
    expect_context::<SessionHandle>().get_value()
}

/// Send the browser to the auth service whenever auth has settled and no
/// user is present.
pub fn install_unauth_redirect(auth: RwSignal<AuthState>) {
    let session = expect_context::<SessionHandle>();
    Effect::new(move || {
        let state = auth.get();
        if should_redirect_unauth(&state) {
            session.with_value(|s| {
                s.redirect_to_auth(None);
            });
        }
    });
}
