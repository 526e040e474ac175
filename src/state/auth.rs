//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Published by `SessionManager` and mirrored into an `RwSignal` so route
//! guards and user-aware components can react to sign-in and sign-out.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::User;

/// Coarse session phase derived from [`AuthState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    /// Hydration or callback processing is still running.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Authentication state tracking the current user and loading status.
///
/// A cached user may be present while `loading` is still true; it is shown
/// optimistically until hydration settles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        match (&self.user, self.loading) {
            (_, true) => AuthStatus::Loading,
            (Some(_), false) => AuthStatus::Authenticated,
            (None, false) => AuthStatus::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }
}
