//! Address-bar access: reading the current URL, rewriting it in place, and
//! full-page navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session lifecycle only ever touches `window.location` and
//! `window.history` through [`Navigator`], so callback handling can be driven
//! natively in tests.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use url::Url;

pub const AUTH_PARAM: &str = "auth";
pub const CODE_PARAM: &str = "code";

/// Browser location surface.
pub trait Navigator {
    /// Absolute URL of the current page, or `None` outside a browser.
    fn current_href(&self) -> Option<String>;
    /// Rewrite the address bar without navigating.
    fn replace_url(&self, url: &str);
    /// Full page load of `url`.
    fn assign(&self, url: &str);
}

/// [`Navigator`] over `window.location` / `window.history`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_href(&self) -> Option<String> {
        #[cfg(feature = "csr")]
        {
            web_sys::window()?.location().href().ok()
        }
        #[cfg(not(feature = "csr"))]
        {
            None
        }
    }

    fn replace_url(&self, url: &str) {
        #[cfg(feature = "csr")]
        {
            if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = url;
        }
    }

    fn assign(&self, url: &str) {
        #[cfg(feature = "csr")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(url);
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = url;
        }
    }
}

/// Handshake parameters the auth service may append to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub auth: Option<String>,
    pub code: Option<String>,
}

impl CallbackParams {
    pub fn from_href(href: &str) -> Self {
        let Ok(url) = Url::parse(href) else {
            return Self::default();
        };
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                AUTH_PARAM if params.auth.is_none() => params.auth = Some(value.into_owned()),
                CODE_PARAM if params.code.is_none() => params.code = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.auth.is_none() && self.code.is_none()
    }
}

/// Path component of an absolute URL.
pub fn path_of(href: &str) -> Option<String> {
    Url::parse(href).ok().map(|url| url.path().to_owned())
}

/// Path plus query and fragment, suitable for returning to after sign-in.
pub fn relative_of(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    let mut relative = url.path().to_owned();
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        relative.push('?');
        relative.push_str(query);
    }
    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        relative.push('#');
        relative.push_str(fragment);
    }
    Some(relative)
}

pub fn current_path(nav: &dyn Navigator) -> Option<String> {
    nav.current_href().as_deref().and_then(path_of)
}

/// Remove every `name` parameter from `href`, keeping other parameters and
/// the fragment. Returns `None` if `href` is not an absolute URL.
pub fn strip_query_param(href: &str, name: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some(url.to_string())
}
