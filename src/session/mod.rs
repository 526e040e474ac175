//! Session lifecycle: persistence, sign-in redirects, and the callback
//! handshake with the central auth service.
//!
//! ARCHITECTURE
//! ============
//! `storage` and `credential` are pure data handling. `redirect` and
//! `callback` drive the round trip to the auth service. `manager` owns the
//! observable `AuthState`. Browser surfaces (`Storage`, `location`, timers,
//! `fetch`) sit behind traits so every flow runs natively in tests.

pub mod callback;
pub mod credential;
pub mod manager;
pub mod navigator;
pub mod redirect;
pub mod storage;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::SessionManager;
