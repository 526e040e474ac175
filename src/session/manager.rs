//! Tab-wide authentication lifecycle.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionManager` is built at the composition root (`app::App`) and
//! handed to pages through context. It owns the `AuthState` and is the only
//! writer of it; components observe it through `subscribe`.
//!
//! STATES
//! ======
//! `loading` -> `authenticated(user)` | `unauthenticated`, driven by:
//! - `init`: optimistic cached user, `loading = true`
//! - `hydrate`: settles the session from storage, or via the identity
//!   endpoint when only a token is known
//! - `login` / `logout`
//! - `handle_unauthorized`: a backend call reported an expired credential
//!
//! After `dispose` every transition is a no-op, so async work finishing
//! after unmount cannot touch the UI.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::navigator::{self, BrowserNavigator, CallbackParams, Navigator};
use super::redirect;
use super::storage::SessionStore;
use crate::config::AuthConfig;
use crate::net::api::{ApiError, HttpIdentityApi, IdentityApi};
use crate::net::types::User;
use crate::state::auth::AuthState;
use crate::util::auth::is_auth_screen;

type Listener = Box<dyn Fn(&AuthState)>;

struct Inner {
    config: AuthConfig,
    store: SessionStore,
    api: Rc<dyn IdentityApi>,
    nav: Rc<dyn Navigator>,
    state: RefCell<AuthState>,
    listeners: RefCell<Vec<Listener>>,
    disposed: Cell<bool>,
}

/// Cheaply clonable handle to the session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    inner: Rc<Inner>,
}

impl SessionManager {
    pub fn new(config: AuthConfig, store: SessionStore, api: Rc<dyn IdentityApi>, nav: Rc<dyn Navigator>) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                store,
                api,
                nav,
                state: RefCell::new(AuthState::default()),
                listeners: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Browser storage, `fetch`, and `window.location`.
    pub fn browser(config: AuthConfig) -> Self {
        let api = HttpIdentityApi::new(config.api_base_url.clone());
        Self::new(config, SessionStore::browser(), Rc::new(api), Rc::new(BrowserNavigator))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.inner.nav.as_ref()
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Call `listener` with every new state.
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        if self.is_disposed() {
            return;
        }
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Synchronous start: publish any cached user while hydration is pending.
    pub fn init(&self) -> AuthState {
        let cached = self.inner.store.load_user();
        self.set_state(|s| {
            s.user = cached;
            s.loading = true;
        });
        self.state()
    }

    /// Settle the session.
    ///
    /// On the callback route this leaves `loading` set; the callback
    /// coordinator finishes the transition. Elsewhere, an `auth` parameter is
    /// consumed and verified; a cached user is trusted until an API call says
    /// otherwise; a bare token is resolved through the identity endpoint.
    pub async fn hydrate(&self) {
        let href = self.inner.nav.current_href();
        let path = href.as_deref().and_then(navigator::path_of);
        if path.as_deref() == Some(self.inner.config.callback_path.as_str()) {
            return;
        }

        let has_url_credential = href.as_deref().is_some_and(|h| CallbackParams::from_href(h).auth.is_some());
        if has_url_credential && self.inner.store.absorb_url_credential(self.navigator()).is_some() {
            self.verify_identity().await;
            return;
        }

        let token = self.inner.store.token();
        match (self.inner.store.load_user(), token) {
            (Some(user), _) => self.set_state(|s| {
                s.user = Some(user);
                s.loading = false;
            }),
            (None, Some(_)) => {
                self.verify_identity().await;
            }
            (None, None) => self.set_state(|s| {
                s.user = None;
                s.loading = false;
            }),
        }
    }

    /// Resolve the authoritative user for the stored token.
    ///
    /// Failure clears the stored session: an unverifiable token is no session.
    pub async fn verify_identity(&self) -> Option<User> {
        let token = self.inner.store.token();
        let result = self.inner.api.whoami(token.as_deref()).await;
        if self.is_disposed() {
            return None;
        }
        match result {
            Ok(user) => {
                self.login(user.clone());
                Some(user)
            }
            Err(e) => {
                leptos::logging::warn!("identity lookup failed: {e}");
                self.inner.store.clear();
                self.set_state(|s| {
                    s.user = None;
                    s.loading = false;
                });
                None
            }
        }
    }

    pub fn login(&self, user: User) {
        if self.is_disposed() {
            return;
        }
        self.inner.store.save_user(&user);
        self.set_state(|s| {
            s.user = Some(user);
            s.loading = false;
        });
    }

    /// End the session. The remote call is best-effort; local state is
    /// always cleared.
    pub async fn logout(&self) {
        let token = self.inner.store.token();
        if let Err(e) = self.inner.api.logout(token.as_deref()).await {
            leptos::logging::warn!("logout request failed: {e}");
        }
        self.inner.store.clear();
        self.set_state(|s| {
            s.user = None;
            s.loading = false;
        });
    }

    /// Mark loading finished without changing the user.
    pub fn finish_loading(&self) {
        self.set_state(|s| s.loading = false);
    }

    /// Stop publishing state and drop all listeners.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        self.inner.listeners.borrow_mut().clear();
    }

    // =========================================================================
    // EXPIRY + REDIRECT
    // =========================================================================

    /// A backend call rejected the credential: drop the session and, unless
    /// already on an auth screen, restart sign-in. Returns whether a redirect
    /// was started.
    pub fn handle_unauthorized(&self) -> bool {
        self.inner.store.clear();
        self.set_state(|s| {
            s.user = None;
            s.loading = false;
        });

        let path = navigator::current_path(self.navigator());
        if path
            .as_deref()
            .is_some_and(|p| is_auth_screen(p, &self.inner.config.callback_path))
        {
            return false;
        }
        self.redirect_to_auth(None).is_some()
    }

    /// Route an API failure: credential-invalid errors expire the session.
    pub fn handle_api_error(&self, err: &ApiError) -> bool {
        if err.is_credential_invalid() {
            leptos::logging::warn!("session expired: {err}");
            self.handle_unauthorized()
        } else {
            false
        }
    }

    pub fn redirect_to_auth(&self, current_path: Option<&str>) -> Option<String> {
        redirect::redirect_to_auth(&self.inner.store, self.navigator(), &self.inner.config, current_path)
    }

    fn set_state(&self, update: impl FnOnce(&mut AuthState)) {
        if self.is_disposed() {
            return;
        }
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            update(&mut state);
            state.clone()
        };
        for listener in self.inner.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }
}
