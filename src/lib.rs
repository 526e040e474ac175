//! # qa-console
//!
//! Leptos + WASM client for the QA automation console.
//!
//! This crate contains the sign-in lifecycle against the central auth
//! service (`session`), the configuration it runs under, the identity API
//! client, and the routes that host it. Business views call the backend
//! through `net` and report expired credentials back to the
//! `SessionManager`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

/// Browser entry point: install diagnostics and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        leptos::logging::warn!("console logger unavailable: {e}");
    }
    leptos::mount::mount_to_body(app::App);
}
