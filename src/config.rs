//! Deployment configuration derived from the page's own location.
//!
//! SYSTEM CONTEXT
//! ==============
//! The same bundle is served from local development and from deployed
//! subdomains, so the auth service and API origins are computed from the
//! current hostname instead of being hardcoded. Build-time overrides:
//!
//! - `QA_CONSOLE_AUTH_URL`: auth service origin
//! - `QA_CONSOLE_API_URL`: backend API origin
//! - `QA_CONSOLE_CLIENT_ID`: client identifier forwarded to the auth service

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_CLIENT_ID: &str = "qa-console";
pub const CALLBACK_PATH: &str = "/callback";
pub const LANDING_PATH: &str = "/dashboard";

pub const LOCAL_AUTH_BASE_URL: &str = "http://localhost:3001";
pub const LOCAL_API_BASE_URL: &str = "http://localhost:8000";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_POLL_ATTEMPTS: u32 = 20;
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 10;

const LOCAL_HOSTNAMES: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "[::1]"];

/// Origins, paths, and timing used by the session lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// Origin serving this application, e.g. `https://app.example.com`.
    pub app_base_url: String,
    /// Origin of the external auth service.
    pub auth_base_url: String,
    /// Origin of the backend REST API.
    pub api_base_url: String,
    pub client_id: String,
    pub callback_path: String,
    pub landing_path: String,
    /// Delay between URL re-checks while waiting for `auth` after a `code` handshake.
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    /// Upper bound on callback processing before forcing the landing path.
    pub callback_timeout: Duration,
}

impl AuthConfig {
    /// Derive every origin from the page protocol (`https:` or `https`) and
    /// host (`app.example.com` or `localhost:5173`).
    pub fn derive(protocol: &str, host: &str) -> Self {
        let scheme = protocol.trim_end_matches(':');
        let scheme = if scheme.is_empty() { "https" } else { scheme };
        let app_base_url = format!("{scheme}://{host}");

        let (auth_base_url, api_base_url) = if is_local_host(host) {
            (LOCAL_AUTH_BASE_URL.to_owned(), LOCAL_API_BASE_URL.to_owned())
        } else {
            let domain = registrable_domain(hostname(host));
            (format!("{scheme}://auth.{domain}"), format!("{scheme}://api.{domain}"))
        };

        Self {
            app_base_url,
            auth_base_url,
            api_base_url,
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            callback_path: CALLBACK_PATH.to_owned(),
            landing_path: LANDING_PATH.to_owned(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            callback_timeout: Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
        }
    }

    /// [`AuthConfig::derive`] plus any build-time overrides.
    pub fn from_location(protocol: &str, host: &str) -> Self {
        let mut config = Self::derive(protocol, host);
        if let Some(url) = option_env!("QA_CONSOLE_AUTH_URL") {
            config.auth_base_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(url) = option_env!("QA_CONSOLE_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(id) = option_env!("QA_CONSOLE_CLIENT_ID") {
            config.client_id = id.to_owned();
        }
        config
    }

    /// Read the current `window.location`. Returns `None` outside a browser.
    pub fn from_browser() -> Option<Self> {
        #[cfg(feature = "csr")]
        {
            let location = web_sys::window()?.location();
            let protocol = location.protocol().ok()?;
            let host = location.host().ok()?;
            Some(Self::from_location(&protocol, &host))
        }
        #[cfg(not(feature = "csr"))]
        {
            None
        }
    }

    /// Absolute callback URL registered with the auth service.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.app_base_url, self.callback_path)
    }
}

fn hostname(host: &str) -> &str {
    if host.starts_with('[') {
        return host.split_once(']').map_or(host, |(addr, _)| addr).trim_start_matches('[');
    }
    host.split(':').next().unwrap_or(host)
}

fn is_local_host(host: &str) -> bool {
    let name = hostname(host);
    LOCAL_HOSTNAMES
        .iter()
        .any(|local| local.trim_matches(|c| c == '[' || c == ']') == name)
        || name.ends_with(".localhost")
}

/// Drop the leading label of hosts with three or more labels:
/// `app.example.com` -> `example.com`, `example.com` stays.
fn registrable_domain(hostname: &str) -> &str {
    if hostname.split('.').count() >= 3 {
        hostname.split_once('.').map_or(hostname, |(_, rest)| rest)
    } else {
        hostname
    }
}
