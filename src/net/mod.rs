//! Networking modules for the QA platform REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls and error classification, and `types` defines the
//! shared wire schema.

pub mod api;
pub mod types;
