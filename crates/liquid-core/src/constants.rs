//! Program-wide constants.

/// Program title, used for directories and the default window title.
pub const PROGRAM_NAME: &str = "liquid";

/// Lowest zoom factor a session accepts.
pub const ZOOM_LEVEL_MIN: f64 = 0.5;
/// Highest zoom factor a session accepts (the engine refuses anything above).
pub const ZOOM_LEVEL_MAX: f64 = 5.0;
/// Zoom step for keyboard shortcuts.
pub const ZOOM_LEVEL_STEP: f64 = 0.1;
/// Zoom step for the Shift-modified shortcuts and Ctrl+wheel.
pub const ZOOM_LEVEL_STEP_FINE: f64 = 0.005;

pub const DEFAULT_PROXY_HOST: &str = "0.0.0.0";
pub const DEFAULT_PROXY_PORT: u16 = 8080;

/// Baseline minimum size of an app window, in logical pixels.
pub const APP_WINDOW_MIN_WIDTH: u32 = 160;
pub const APP_WINDOW_MIN_HEIGHT: u32 = 120;

/// Textual status glyphs appended to window titles.
pub const GLYPH_LOCKED: &str = "🖼";
pub const GLYPH_MUTED: &str = "🔇";
pub const GLYPH_LOADING: &str = "⏳";
pub const GLYPH_ERROR: &str = "❌";
