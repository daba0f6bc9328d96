//! Application layer for Liquid.
//!
//! Resolves an app name to a running session: finds or creates the app record,
//! enforces one instance per app, and drives the session's event loop.

pub mod launch;
pub mod session_runner;

pub use launch::{CreateFlow, LaunchCoordinator, LaunchOutcome, ReadyApp};
pub use session_runner::{EventSender, SessionRunner, TimerScheduler, event_channel};
