//! Session domain module.
//!
//! One session is one running app window: a browsing surface inside a
//! window host, driven by [`SessionWindowController`].
//!
//! # Module Structure
//!
//! - `event`: events and actions delivered to a session (`SessionEvent`, `WindowAction`)
//! - `title`: window title composition with status glyphs
//! - `shortcut`: keyboard shortcut table
//! - `controller`: the session state machine (`SessionWindowController`)

mod controller;
pub mod event;
pub mod shortcut;
mod title;


pub use controller::{SessionConfig, SessionWindowController};
pub use event::{
    Flow, NavigationAttempt, SessionEvent, SessionTimer, SurfaceEvent, WindowAction, WindowEvent,
};
pub use title::{LoadState, compose_title};
