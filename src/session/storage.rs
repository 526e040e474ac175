//! Persistence for the signed-in user, bearer token, and per-attempt auth state.
//!
//! STORAGE POLICY
//! ==============
//! The durable store (`localStorage`) is authoritative for the user record and
//! the bearer token. Writes go there first and only land in the tab store
//! (`sessionStorage`) when the durable write fails. Reads fall back to the tab
//! store; a value found only there is migrated into the durable store.
//! The correlation id and the redirect target are tab-scoped and never touch
//! the durable store.
//!
//! Every operation is best-effort: unavailable storage or corrupt JSON reads
//! as "no session" and never surfaces to callers.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::credential::{self, InboundCredential};
use super::navigator::{self, Navigator};
use crate::net::types::User;

pub const USER_KEY: &str = "qa_console_user";
pub const TOKEN_KEY: &str = "qa_console_token";
pub const CORRELATION_ID_KEY: &str = "qa_console_auth_session_id";
pub const REDIRECT_TARGET_KEY: &str = "qa_console_redirect_after_auth";

/// String-keyed storage area.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns `false` when the write was refused (quota, disabled storage).
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str);
}

/// In-process store used natively and in tests.
#[derive(Debug)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    writable: Cell<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self { items: RefCell::new(HashMap::new()), writable: Cell::new(true) }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a full or disabled storage area.
    pub fn set_writable(&self, writable: bool) {
        self.writable.set(writable);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if !self.writable.get() {
            return false;
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        true
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Which browser storage area a [`BrowserStore`] wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// `window.localStorage` / `window.sessionStorage`. Inert outside a browser.
#[derive(Clone, Copy, Debug)]
pub struct BrowserStore {
    area: StorageArea,
}

impl BrowserStore {
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    #[cfg(feature = "csr")]
    fn storage(self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        match self.area {
            StorageArea::Local => window.local_storage().ok().flatten(),
            StorageArea::Session => window.session_storage().ok().flatten(),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "csr")]
        {
            self.storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
            None
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        #[cfg(feature = "csr")]
        {
            self.storage().is_some_and(|s| s.set_item(key, value).is_ok())
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (key, value);
            false
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(feature = "csr")]
        {
            if let Some(storage) = self.storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
        }
    }
}

/// What [`SessionStore::absorb_url_credential`] found in the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthArrival {
    /// A signed token was stored; `user` is set when its payload named a subject.
    Signed { user: Option<User> },
    /// A legacy identity blob was stored without any bearer token.
    Legacy { user: User },
}

impl AuthArrival {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Signed { user } => user.as_ref(),
            Self::Legacy { user } => Some(user),
        }
    }
}

/// Session persistence over a durable store and a tab-scoped store.
#[derive(Clone)]
pub struct SessionStore {
    durable: Rc<dyn KeyValueStore>,
    tab: Rc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(durable: Rc<dyn KeyValueStore>, tab: Rc<dyn KeyValueStore>) -> Self {
        Self { durable, tab }
    }

    /// `localStorage` as the durable store, `sessionStorage` as the tab store.
    pub fn browser() -> Self {
        Self::new(
            Rc::new(BrowserStore::new(StorageArea::Local)),
            Rc::new(BrowserStore::new(StorageArea::Session)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::new()), Rc::new(MemoryStore::new()))
    }

    // =========================================================================
    // USER + TOKEN
    // =========================================================================

    pub fn save_user(&self, user: &User) {
        let Ok(raw) = serde_json::to_string(user) else {
            return;
        };
        self.write_authoritative(USER_KEY, &raw);
    }

    pub fn load_user(&self) -> Option<User> {
        self.read_authoritative(USER_KEY, |raw| serde_json::from_str::<User>(raw).ok())
    }

    pub fn save_token(&self, token: &str) {
        self.write_authoritative(TOKEN_KEY, token);
    }

    pub fn token(&self) -> Option<String> {
        self.read_authoritative(TOKEN_KEY, |raw| (!raw.is_empty()).then(|| raw.to_owned()))
    }

    /// Remove the user record and token from both stores, along with any
    /// pending correlation id. Idempotent.
    pub fn clear(&self) {
        for key in [USER_KEY, TOKEN_KEY] {
            self.durable.remove(key);
            self.tab.remove(key);
        }
        self.tab.remove(CORRELATION_ID_KEY);
    }

    fn write_authoritative(&self, key: &str, value: &str) {
        if self.durable.set(key, value) {
            self.tab.remove(key);
        } else {
            let _ = self.tab.set(key, value);
        }
    }

    fn read_authoritative<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        if let Some(value) = self.durable.get(key).as_deref().and_then(&parse) {
            return Some(value);
        }
        let raw = self.tab.get(key)?;
        let value = parse(&raw)?;
        if self.durable.set(key, &raw) {
            self.tab.remove(key);
        }
        Some(value)
    }

    // =========================================================================
    // PER-ATTEMPT STATE
    // =========================================================================

    pub fn correlation_id(&self) -> Option<String> {
        self.tab.get(CORRELATION_ID_KEY).filter(|id| !id.is_empty())
    }

    /// Return the pending correlation id, minting and storing one if absent.
    pub fn ensure_correlation_id(&self) -> String {
        if let Some(id) = self.correlation_id() {
            return id;
        }
        let id = uuid::Uuid::new_v4().to_string();
        let _ = self.tab.set(CORRELATION_ID_KEY, &id);
        id
    }

    pub fn clear_correlation_id(&self) {
        self.tab.remove(CORRELATION_ID_KEY);
    }

    pub fn remember_redirect_target(&self, path: &str) {
        let _ = self.tab.set(REDIRECT_TARGET_KEY, path);
    }

    /// Consume the remembered redirect target. A second call returns `None`.
    pub fn take_redirect_target(&self) -> Option<String> {
        let path = self.tab.get(REDIRECT_TARGET_KEY)?;
        self.tab.remove(REDIRECT_TARGET_KEY);
        (!path.is_empty()).then_some(path)
    }

    // =========================================================================
    // INBOUND CREDENTIAL
    // =========================================================================

    /// Consume an `auth` query parameter from the current URL, if one is there.
    ///
    /// On success the token and/or user are persisted, the correlation id is
    /// cleared, and `auth` is stripped from the address bar by history
    /// replacement. On a malformed value nothing is stored and the URL is left
    /// alone.
    pub fn absorb_url_credential(&self, nav: &dyn Navigator) -> Option<AuthArrival> {
        let href = nav.current_href()?;
        let raw = navigator::CallbackParams::from_href(&href).auth?;

        let arrival = match credential::parse(&raw) {
            Ok(InboundCredential::Signed { token, user }) => {
                self.save_token(&token);
                match &user {
                    Some(user) => self.save_user(user),
                    None => leptos::logging::log!("token payload carried no user; deferring to identity lookup"),
                }
                AuthArrival::Signed { user }
            }
            Ok(InboundCredential::Legacy { user }) => {
                self.save_user(&user);
                leptos::logging::warn!("auth callback delivered a legacy identity blob without a bearer token; API calls will be rejected");
                AuthArrival::Legacy { user }
            }
            Err(e) => {
                leptos::logging::warn!("ignoring auth parameter: {e}");
                return None;
            }
        };

        self.clear_correlation_id();
        if let Some(stripped) = navigator::strip_query_param(&href, navigator::AUTH_PARAM) {
            nav.replace_url(&stripped);
        }
        Some(arrival)
    }

    /// Whether the current URL carried a usable `auth` parameter.
    pub fn check_url_for_auth(&self, nav: &dyn Navigator) -> bool {
        self.absorb_url_credential(nav).is_some()
    }
}
