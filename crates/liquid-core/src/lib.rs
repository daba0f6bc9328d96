//! Core domain of Liquid: websites run as standalone apps.
//!
//! This crate holds the app record model, the policies applied to a running
//! session (cookies, navigation, startup scripts) and the session state
//! machine. It performs no I/O; storage and the browsing engine are reached
//! through the [`app::AppConfigRepository`] and [`surface`] traits.

pub mod app;
pub mod constants;
pub mod cookie_jar;
pub mod error;
pub mod navigation;
pub mod script;
pub mod session;
pub mod surface;

pub use error::{LiquidError, Result};
