//! Reusable UI component modules.

pub mod loading_screen;
