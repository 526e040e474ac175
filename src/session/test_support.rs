//! In-memory doubles for the browser seams of the session lifecycle.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::pin::{Pin, pin};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::LocalBoxFuture;

use super::manager::SessionManager;
use super::navigator::Navigator;
use super::storage::{MemoryStore, SessionStore};
use super::timer::Timer;
use crate::config::AuthConfig;
use crate::net::api::{ApiError, IdentityApi};
use crate::net::types::User;

pub(crate) const APP: &str = "https://app.example.com";

pub(crate) fn config() -> AuthConfig {
    AuthConfig::derive("https:", "app.example.com")
}

pub(crate) fn user(id: &str) -> User {
    User {
        id: id.to_owned(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        picture: None,
    }
}

/// A [`SessionStore`] plus handles on its two backing stores.
pub(crate) struct Stores {
    pub durable: Rc<MemoryStore>,
    pub tab: Rc<MemoryStore>,
    pub session: SessionStore,
}

pub(crate) fn stores() -> Stores {
    let durable = Rc::new(MemoryStore::new());
    let tab = Rc::new(MemoryStore::new());
    let session = SessionStore::new(durable.clone(), tab.clone());
    Stores { durable, tab, session }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

#[derive(Default)]
pub(crate) struct MemoryNavigator {
    href: RefCell<Option<String>>,
    /// `(reads remaining, href)`: switch to `href` once that many reads happened.
    scheduled: RefCell<Option<(usize, String)>>,
    pub reads: Cell<usize>,
    pub replaced: RefCell<Vec<String>>,
    pub assigned: RefCell<Vec<String>>,
}

impl MemoryNavigator {
    pub fn at(href: &str) -> Self {
        Self { href: RefCell::new(Some(href.to_owned())), ..Self::default() }
    }

    /// Outside a browser: no location at all.
    pub fn detached() -> Self {
        Self::default()
    }

    /// After `reads` more calls to `current_href`, report `href` instead.
    pub fn change_after(&self, reads: usize, href: &str) {
        *self.scheduled.borrow_mut() = Some((reads, href.to_owned()));
    }

    pub fn href(&self) -> Option<String> {
        self.href.borrow().clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_href(&self) -> Option<String> {
        self.reads.set(self.reads.get() + 1);
        let due = match self.scheduled.borrow_mut().as_mut() {
            Some((0, _)) => true,
            Some((remaining, _)) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if due {
            if let Some((_, next)) = self.scheduled.borrow_mut().take() {
                *self.href.borrow_mut() = Some(next);
            }
        }
        self.href.borrow().clone()
    }

    fn replace_url(&self, url: &str) {
        self.replaced.borrow_mut().push(url.to_owned());
        *self.href.borrow_mut() = Some(url.to_owned());
    }

    fn assign(&self, url: &str) {
        self.assigned.borrow_mut().push(url.to_owned());
    }
}

// =============================================================================
// TIMER
// =============================================================================

/// Every sleep completes immediately; durations are recorded.
#[derive(Default)]
pub(crate) struct InstantTimer {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl Timer for InstantTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.sleeps.borrow_mut().push(duration);
        Box::pin(futures::future::ready(()))
    }
}

/// Sleeps shorter than `threshold` never complete; longer ones complete immediately.
pub(crate) struct StallingTimer {
    pub threshold: Duration,
}

impl Timer for StallingTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        if duration < self.threshold {
            Box::pin(futures::future::pending())
        } else {
            Box::pin(futures::future::ready(()))
        }
    }
}

/// Timer on a virtual clock. Sleeps fire one at a time in
/// `(deadline, registration)` order, as `setTimeout` callbacks do.
#[derive(Clone, Default)]
pub(crate) struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_seq: u64,
    pending: BTreeSet<(Duration, u64)>,
    fired: HashSet<u64>,
}

impl VirtualClock {
    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Drive `future` to completion, advancing time whenever it is only
    /// waiting on sleeps.
    pub fn run<T>(&self, future: impl Future<Output = T>) -> T {
        let mut future = pin!(future);
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
            assert!(self.fire_next(), "future is blocked on something other than the clock");
        }
    }

    fn fire_next(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let Some((deadline, seq)) = state.pending.pop_first() else {
            return false;
        };
        state.now = deadline;
        state.fired.insert(seq);
        true
    }
}

impl Timer for VirtualClock {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let key = {
            let mut state = self.state.borrow_mut();
            let key = (state.now + duration, state.next_seq);
            state.next_seq += 1;
            state.pending.insert(key);
            key
        };
        Box::pin(VirtualSleep { state: self.state.clone(), key })
    }
}

struct VirtualSleep {
    state: Rc<RefCell<ClockState>>,
    key: (Duration, u64),
}

impl Future for VirtualSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.state.borrow_mut().fired.remove(&self.key.1) { Poll::Ready(()) } else { Poll::Pending }
    }
}

impl Drop for VirtualSleep {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pending.remove(&self.key);
        state.fired.remove(&self.key.1);
    }
}

// =============================================================================
// IDENTITY API
// =============================================================================

#[derive(Default)]
pub(crate) struct MockIdentityApi {
    pub whoami_result: RefCell<Option<Result<User, ApiError>>>,
    pub logout_error: RefCell<Option<ApiError>>,
    /// `whoami` never resolves.
    pub hang: Cell<bool>,
    pub whoami_calls: Cell<usize>,
    pub logout_calls: Cell<usize>,
    pub tokens_seen: RefCell<Vec<Option<String>>>,
}

impl MockIdentityApi {
    pub fn returning(user: User) -> Self {
        Self { whoami_result: RefCell::new(Some(Ok(user))), ..Self::default() }
    }

    pub fn failing(error: ApiError) -> Self {
        Self { whoami_result: RefCell::new(Some(Err(error))), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.whoami_calls.get() + self.logout_calls.get()
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityApi for MockIdentityApi {
    async fn whoami(&self, token: Option<&str>) -> Result<User, ApiError> {
        self.whoami_calls.set(self.whoami_calls.get() + 1);
        self.tokens_seen.borrow_mut().push(token.map(str::to_owned));
        if self.hang.get() {
            return futures::future::pending().await;
        }
        self.whoami_result
            .borrow()
            .clone()
            .unwrap_or(Err(ApiError::Network("no scripted response".to_owned())))
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        self.tokens_seen.borrow_mut().push(token.map(str::to_owned));
        match self.logout_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// =============================================================================
// MANAGER HARNESS
// =============================================================================

pub(crate) struct Harness {
    pub stores: Stores,
    pub api: Rc<MockIdentityApi>,
    pub nav: Rc<MemoryNavigator>,
    pub manager: SessionManager,
}

/// A manager at `path` (relative to [`APP`]) backed by `api`.
pub(crate) fn harness(path: &str, api: MockIdentityApi) -> Harness {
    let stores = stores();
    let api = Rc::new(api);
    let nav = Rc::new(MemoryNavigator::at(&format!("{APP}{path}")));
    let manager = SessionManager::new(config(), stores.session.clone(), api.clone(), nav.clone());
    Harness { stores, api, nav, manager }
}
