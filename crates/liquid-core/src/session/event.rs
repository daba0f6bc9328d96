//! Events delivered to a running session.

use strum::{Display, EnumIter};
use url::Url;

use crate::app::Cookie;
use crate::navigation::NavigationKind;

/// Something the browsing engine reported.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    LoadStarted,
    LoadFinished { ok: bool },
    /// The document URL changed (after redirects, history moves, in-page links).
    UrlChanged(Url),
    TitleChanged(String),
    IconChanged(Vec<u8>),
    CookieAdded(Cookie),
    CookieRemoved(Cookie),
    /// The page asks to navigate; the session decides synchronously.
    NavigationRequested(NavigationAttempt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationAttempt {
    pub url: Url,
    pub kind: NavigationKind,
    pub is_main_frame: bool,
    pub user_forced_external: bool,
}

/// Window-level changes reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Moved,
    Resized,
    /// Ctrl+wheel; positive `delta` zooms in.
    ZoomWheel { delta: i32 },
}

/// A user command, usually bound to a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum WindowAction {
    ToggleMute,
    GoBack,
    GoForward,
    Reload,
    HardReload,
    ToggleFullscreen,
    StopOrExitFullscreen,
    ToggleGeometryLock,
    ZoomIn,
    ZoomOut,
    ZoomInFine,
    ZoomOutFine,
    ZoomReset,
    Quit,
}

/// One-shot timers a session asks its window host to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTimer {
    /// The platform finished animating out of fullscreen.
    FullscreenSettled,
    /// Debounced geometry write-back.
    SaveGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Surface(SurfaceEvent),
    Window(WindowEvent),
    Action(WindowAction),
    Timer(SessionTimer),
    /// Another process asked this instance to come to the front.
    RaiseRequested,
    /// The window is closing (close button, Ctrl-C, SIGTERM).
    CloseRequested,
}

/// Whether the event loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
