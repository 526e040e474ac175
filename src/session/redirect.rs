//! Hand-off to the external auth service.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use super::navigator::{self, Navigator};
use super::storage::SessionStore;
use crate::config::AuthConfig;

/// `<auth-base>/?redirect_uri=..&client_id=..&authorization_session_id=..`
pub fn build_auth_url(config: &AuthConfig, correlation_id: &str) -> String {
    format!(
        "{}/?redirect_uri={}&client_id={}&authorization_session_id={}",
        config.auth_base_url.trim_end_matches('/'),
        urlencoding::encode(&config.callback_url()),
        urlencoding::encode(&config.client_id),
        urlencoding::encode(correlation_id),
    )
}

/// Send the browser to the auth service, remembering where to come back to.
///
/// `current_path` defaults to the current location. The callback route itself
/// is never remembered, otherwise a completed sign-in would land back on the
/// callback screen. A pending correlation id is reused so a double click does
/// not invalidate an in-flight attempt; it is left in place for the callback
/// to clear.
///
/// Returns the URL navigated to, or `None` outside a browser.
pub fn redirect_to_auth(
    store: &SessionStore,
    nav: &dyn Navigator,
    config: &AuthConfig,
    current_path: Option<&str>,
) -> Option<String> {
    let href = nav.current_href()?;
    let return_to = match current_path {
        Some(path) => path.to_owned(),
        None => navigator::relative_of(&href).unwrap_or_else(|| "/".to_owned()),
    };

    let return_path = return_to.split(['?', '#']).next().unwrap_or_default();
    if return_path != config.callback_path {
        store.remember_redirect_target(&return_to);
    }

    let correlation_id = store.ensure_correlation_id();
    let url = build_auth_url(config, &correlation_id);
    leptos::logging::log!("redirecting to auth service (return to {return_to})");
    nav.assign(&url);
    Some(url)
}
