//! Capabilities the session controller drives.
//!
//! A concrete embedder (a real web view, or the headless surface in the
//! binary) implements these traits. The controller never talks to an engine
//! directly, which keeps it testable with plain mocks.

use std::time::Duration;

use url::Url;

use crate::app::{AppName, Cookie, ProxySettings, Rgba};
use crate::error::Result;
use crate::script::StartupScript;
use crate::session::event::{NavigationAttempt, SessionTimer};

/// Static engine configuration derived from an app record.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSettings {
    pub javascript_enabled: bool,
    pub scroll_bars_hidden: bool,
    pub user_agent: Option<String>,
    pub background_color: Option<Rgba>,
    pub proxy: ProxySettings,
    pub audio_muted: bool,
}

/// The live cookie store of a browsing session.
pub trait LiveCookieStore {
    /// Injects a cookie as if it had been set by `origin`.
    fn set_cookie(&mut self, cookie: &Cookie, origin: &Url);

    fn delete_cookie(&mut self, cookie: &Cookie);
}

/// One isolated browsing context (a single tab's worth of web view).
pub trait BrowsingSurface {
    /// Creates the isolated profile for `app`; called once before anything else.
    fn open_profile(&mut self, app: &AppName) -> Result<()>;

    fn apply_settings(&mut self, settings: &SurfaceSettings);

    fn add_startup_script(&mut self, script: &StartupScript);

    /// Starts a fresh main-frame navigation.
    fn navigate(&mut self, url: &Url);

    /// Lets an allowed page-initiated navigation continue in the frame that
    /// requested it. Attempts that never reach here are cancelled.
    fn proceed(&mut self, attempt: &NavigationAttempt);

    fn reload(&mut self);

    fn go_back(&mut self);

    fn go_forward(&mut self);

    fn stop(&mut self);

    /// Synchronously detaches the current document and shows `placeholder_title`.
    fn clear_content(&mut self, placeholder_title: &str);

    fn set_zoom_factor(&mut self, factor: f64);

    fn set_audio_muted(&mut self, muted: bool);

    /// Hands a URL to the system's default external handler.
    fn open_external(&mut self, url: &Url);

    fn cookie_store(&mut self) -> &mut dyn LiveCookieStore;
}

/// Logical size of a window in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The top-level window hosting a surface.
pub trait WindowHost {
    fn set_title(&mut self, title: &str);

    fn set_icon(&mut self, icon: &[u8]);

    fn set_frameless(&mut self, frameless: bool);

    /// Restores a blob produced by [`WindowHost::save_geometry`]; `false` if unusable.
    fn restore_geometry(&mut self, geometry: &[u8]) -> bool;

    fn save_geometry(&self) -> Vec<u8>;

    fn size(&self) -> WindowSize;

    fn set_min_size(&mut self, size: WindowSize);

    /// `None` removes the maximum size constraint.
    fn set_max_size(&mut self, size: Option<WindowSize>);

    fn set_fullscreen(&mut self, fullscreen: bool);

    fn raise(&mut self);

    /// Requests a one-shot `SessionEvent::Timer(timer)` after `delay`.
    ///
    /// Starting a timer that is already pending restarts it.
    fn start_timer(&mut self, timer: SessionTimer, delay: Duration);

    fn show(&mut self);
}
