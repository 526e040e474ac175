//! Completion of the sign-in round trip on the callback route.
//!
//! The auth service returns to `/callback` in one of two shapes:
//! `?auth=<credential>` directly, or `?code=<code>` while it finishes a
//! server-side exchange and rewrites the URL to add `auth` shortly after.
//! [`complete_callback`] consumes whichever arrives and reports where the
//! browser should go next. It never leaves the user on the callback screen:
//! `code` polling stops after `poll_attempts` checks, and the `auth`
//! exchange races a fixed timeout whose loser is dropped.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use super::manager::SessionManager;
use super::navigator::CallbackParams;
use super::storage::AuthArrival;
use super::timer::{Timer, with_timeout};

/// How the callback visit was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackResolution {
    /// No handshake parameters, but a session already exists (page refresh).
    AlreadyAuthenticated,
    /// Signed token stored and identity confirmed by the API.
    Authenticated,
    /// Legacy identity blob stored; there is no bearer token.
    LegacyIdentity,
    /// Token stored but the identity lookup failed; the session was cleared.
    VerificationFailed,
    /// `auth` was present but unreadable.
    MalformedCredential,
    /// Only `code` arrived and `auth` never appeared within the polling window.
    CodeTimedOut,
    /// The `auth` exchange exceeded the callback timeout.
    Stalled,
    /// Neither parameter and no session.
    NoCredential,
}

impl CallbackResolution {
    pub fn is_signed_in(self) -> bool {
        matches!(self, Self::AlreadyAuthenticated | Self::Authenticated | Self::LegacyIdentity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Application path to navigate to.
    pub destination: String,
    pub resolution: CallbackResolution,
}

/// Drive the callback route to completion.
pub async fn complete_callback(session: &SessionManager, timer: &dyn Timer) -> CallbackOutcome {
    let config = session.config();
    let params = session
        .navigator()
        .current_href()
        .map(|href| CallbackParams::from_href(&href))
        .unwrap_or_default();

    let resolution = if params.is_empty() {
        match session.store().load_user() {
            Some(user) => {
                session.login(user);
                CallbackResolution::AlreadyAuthenticated
            }
            None => CallbackResolution::NoCredential,
        }
    } else if params.auth.is_none() && !wait_for_auth_param(session, timer).await {
        CallbackResolution::CodeTimedOut
    } else {
        match with_timeout(timer, config.callback_timeout, exchange_credential(session)).await {
            Some(resolution) => resolution,
            None => {
                leptos::logging::warn!(
                    "auth callback still pending after {:?}; continuing to {}",
                    config.callback_timeout,
                    config.landing_path
                );
                CallbackResolution::Stalled
            }
        }
    };

    session.store().clear_correlation_id();
    if session.state().loading {
        match session.store().load_user() {
            Some(user) => session.login(user),
            None => session.finish_loading(),
        }
    }

    let remembered = if resolution.is_signed_in() { session.store().take_redirect_target() } else { None };
    let destination = remembered.unwrap_or_else(|| config.landing_path.clone());

    leptos::logging::log!("auth callback resolved as {resolution:?}; navigating to {destination}");
    CallbackOutcome { destination, resolution }
}

/// Store the `auth` credential and settle the identity it carries.
async fn exchange_credential(session: &SessionManager) -> CallbackResolution {
    match session.store().absorb_url_credential(session.navigator()) {
        None => CallbackResolution::MalformedCredential,
        Some(AuthArrival::Legacy { user }) => {
            session.login(user);
            CallbackResolution::LegacyIdentity
        }
        Some(AuthArrival::Signed { .. }) => {
            if session.verify_identity().await.is_some() {
                CallbackResolution::Authenticated
            } else {
                CallbackResolution::VerificationFailed
            }
        }
    }
}

/// Re-read the live URL every `poll_interval` until `auth` shows up, at most
/// `poll_attempts` times.
async fn wait_for_auth_param(session: &SessionManager, timer: &dyn Timer) -> bool {
    let config = session.config();
    for _ in 0..config.poll_attempts {
        timer.sleep(config.poll_interval).await;
        let found = session
            .navigator()
            .current_href()
            .is_some_and(|href| CallbackParams::from_href(&href).auth.is_some());
        if found {
            return true;
        }
    }
    leptos::logging::warn!("no auth parameter after {} checks; giving up on code handshake", config.poll_attempts);
    false
}
