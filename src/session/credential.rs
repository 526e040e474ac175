//! Parsing of credentials delivered through the callback URL.
//!
//! The auth service hands control back with `?auth=<value>`, where the value
//! is either a three-segment signed token or a legacy base64 JSON identity
//! blob. Both shapes are accepted until the legacy one is retired upstream.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::net::types::User;

const ID_CLAIMS: &[&str] = &["sub", "user_id", "id"];
const NAME_CLAIMS: &[&str] = &["name", "full_name", "username"];
const EMAIL_CLAIMS: &[&str] = &["email"];
const PICTURE_CLAIMS: &[&str] = &["picture", "avatar_url"];

/// One-time credential carried by the `auth` parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundCredential {
    /// Bearer token; `user` is the identity decoded from its payload, if any.
    Signed { token: String, user: Option<User> },
    /// Identity only, no bearer token.
    Legacy { user: User },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("empty credential")]
    Empty,
    #[error("credential is not valid base64")]
    NotBase64,
    #[error("credential payload is not a user object: {0}")]
    NotUser(String),
    #[error("token payload has no subject")]
    NoSubject,
}

/// Classify and decode an `auth` parameter value.
///
/// A signed token is accepted even when its payload cannot be decoded; the
/// identity is then resolved later through the API.
///
/// # Errors
///
/// Returns a [`CredentialError`] when the value is neither a three-segment
/// token nor a base64-encoded user object.
pub fn parse(raw: &str) -> Result<InboundCredential, CredentialError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CredentialError::Empty);
    }

    if is_signed_token(raw) {
        let user = match user_from_token(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                leptos::logging::warn!("could not read identity from token payload: {e}");
                None
            }
        };
        return Ok(InboundCredential::Signed { token: raw.to_owned(), user });
    }

    let bytes = decode_segment(raw)?;
    let user = serde_json::from_slice::<User>(&bytes).map_err(|e| CredentialError::NotUser(e.to_string()))?;
    Ok(InboundCredential::Legacy { user })
}

/// Three dot-delimited segments with a non-empty header and payload.
pub fn is_signed_token(raw: &str) -> bool {
    let segments: Vec<&str> = raw.split('.').collect();
    segments.len() == 3 && !segments[0].is_empty() && !segments[1].is_empty()
}

/// Decode the payload segment of a signed token into a [`User`].
///
/// # Errors
///
/// Returns a [`CredentialError`] when the payload is not base64 JSON or
/// names no subject.
pub fn user_from_token(token: &str) -> Result<User, CredentialError> {
    let payload = token.split('.').nth(1).ok_or(CredentialError::Empty)?;
    let bytes = decode_segment(payload)?;
    let claims: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::NotUser(e.to_string()))?;
    user_from_claims(&claims).ok_or(CredentialError::NoSubject)
}

/// Build a [`User`] from token claims. Requires an id.
pub fn user_from_claims(claims: &Map<String, Value>) -> Option<User> {
    let id = first_claim(claims, ID_CLAIMS)?;
    let email = first_claim(claims, EMAIL_CLAIMS).unwrap_or_default();
    let name = first_claim(claims, NAME_CLAIMS).unwrap_or_else(|| email.clone());
    let picture = first_claim(claims, PICTURE_CLAIMS);
    Some(User { id, name, email, picture })
}

fn first_claim(claims: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match claims.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode base64 in either alphabet, padded or not. A `+` that query decoding
/// turned into a space is restored first.
///
/// # Errors
///
/// Returns [`CredentialError::NotBase64`] on invalid input.
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, CredentialError> {
    let normalized: String = segment
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            ' ' | '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|_| CredentialError::NotBase64)
}
