//! REST helpers for the QA platform API.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`, with the stored bearer
//! token attached and cookies included.
//! Native builds: stubs returning [`ApiError::Unavailable`], since these
//! endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is an [`ApiError`]. Callers hand errors to
//! `SessionManager::handle_api_error`, which turns credential-invalid
//! responses into a session expiry.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::User;

pub const WHOAMI_PATH: &str = "/auth/me";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Backend error messages that mean the bearer token is no longer accepted.
const CREDENTIAL_INVALID_MESSAGES: &[&str] = &["Could not validate credentials", "Invalid authentication credentials"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("credential rejected ({status})")]
    Unauthorized { status: u16 },
    #[error("request failed: {status}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("not available outside the browser")]
    Unavailable,
}

impl ApiError {
    /// Whether this error should be treated as an expired session.
    pub fn is_credential_invalid(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Classify a non-success HTTP response.
pub fn classify_failure(status: u16, body: &str) -> ApiError {
    if status == 401 || CREDENTIAL_INVALID_MESSAGES.iter().any(|msg| body.contains(msg)) {
        ApiError::Unauthorized { status }
    } else {
        ApiError::Status { status, body: body.to_owned() }
    }
}

#[cfg(any(test, feature = "csr"))]
fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Identity endpoints the session lifecycle depends on.
#[async_trait::async_trait(?Send)]
pub trait IdentityApi {
    /// `GET /auth/me`: resolve the authoritative user for `token`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the credential is rejected.
    async fn whoami(&self, token: Option<&str>) -> Result<User, ApiError>;

    /// `POST /auth/logout`: end the server-side session.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;
}

/// [`IdentityApi`] backed by `fetch`.
#[derive(Clone, Debug)]
pub struct HttpIdentityApi {
    base_url: String,
}

impl HttpIdentityApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_owned() }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityApi for HttpIdentityApi {
    async fn whoami(&self, token: Option<&str>) -> Result<User, ApiError> {
        get_json::<User>(&self.endpoint(WHOAMI_PATH), token).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        #[cfg(feature = "csr")]
        {
            let mut request = gloo_net::http::Request::post(&self.endpoint(LOGOUT_PATH))
                .credentials(web_sys::RequestCredentials::Include);
            if let Some(token) = token {
                request = request.header("Authorization", &bearer_header(token));
            }
            let resp = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
            if !resp.ok() {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify_failure(resp.status(), &body));
            }
            Ok(())
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = token;
            Err(ApiError::Unavailable)
        }
    }
}

/// Authenticated `GET` decoding a JSON body.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for rejected credentials, and other
/// variants for transport, status, or decode failures.
pub async fn get_json<T: serde::de::DeserializeOwned>(url: &str, token: Option<&str>) -> Result<T, ApiError> {
    #[cfg(feature = "csr")]
    {
        let mut request =
            gloo_net::http::Request::get(url).credentials(web_sys::RequestCredentials::Include);
        if let Some(token) = token {
            request = request.header("Authorization", &bearer_header(token));
        }
        let resp = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.ok() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(resp.status(), &body));
        }
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (url, token);
        Err(ApiError::Unavailable)
    }
}
