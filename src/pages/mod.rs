//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates session work to
//! `session` and rendering details to `components`.

pub mod callback;
pub mod dashboard;
