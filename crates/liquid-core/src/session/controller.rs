use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use super::event::{
    Flow, NavigationAttempt, SessionEvent, SessionTimer, SurfaceEvent, WindowAction, WindowEvent,
};
use super::title::{LoadState, compose_title};
use crate::app::{AppConfigRepository, AppRecord, clamp_zoom};
use crate::constants::{
    APP_WINDOW_MIN_HEIGHT, APP_WINDOW_MIN_WIDTH, ZOOM_LEVEL_STEP, ZOOM_LEVEL_STEP_FINE,
};
use crate::cookie_jar::CookieJarBridge;
use crate::error::Result;
use crate::navigation::{NavigationDecision, NavigationPolicy, NavigationRequest};
use crate::script::ScriptInjector;
use crate::surface::{BrowsingSurface, SurfaceSettings, WindowHost, WindowSize};

/// Timing knobs of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wait after leaving fullscreen before re-pinning a locked window size.
    pub fullscreen_settle_delay: Duration,
    /// Quiet period after the last move/resize before geometry is saved.
    pub geometry_save_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fullscreen_settle_delay: Duration::from_millis(200),
            geometry_save_delay: Duration::from_millis(1000),
        }
    }
}

const BASELINE_MIN_SIZE: WindowSize = WindowSize::new(APP_WINDOW_MIN_WIDTH, APP_WINDOW_MIN_HEIGHT);

/// State machine of one running app window.
///
/// The controller owns the app record for the lifetime of the session and
/// writes every change that must survive a crash back through the store.
/// It is driven entirely by [`SessionEvent`]s on a single thread.
pub struct SessionWindowController<S: BrowsingSurface, W: WindowHost> {
    record: AppRecord,
    store: Arc<dyn AppConfigRepository>,
    surface: S,
    window: W,
    config: SessionConfig,
    start_url: Url,
    cookies: CookieJarBridge,
    navigation: NavigationPolicy,
    load_state: LoadState,
    forgive_next_error: bool,
    fullscreen: bool,
    page_title: Option<String>,
    current_url: Option<Url>,
    icon_event_seen: bool,
}

impl<S: BrowsingSurface, W: WindowHost> SessionWindowController<S, W> {
    /// Configures the surface and window from `record` and starts loading.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` when the starting URL cannot be parsed; nothing
    /// is shown in that case.
    pub fn launch(
        record: AppRecord,
        store: Arc<dyn AppConfigRepository>,
        surface: S,
        window: W,
        config: SessionConfig,
    ) -> Result<Self> {
        let start_url = record.start_url()?;

        info!(app = %record.name, "[Session] Launching at {}", start_url);

        let mut controller = Self {
            cookies: CookieJarBridge::new(&record),
            navigation: NavigationPolicy::new(record.additional_domains().clone()),
            record,
            store,
            surface,
            window,
            config,
            start_url,
            load_state: LoadState::Loading,
            forgive_next_error: false,
            fullscreen: false,
            page_title: None,
            current_url: None,
            icon_event_seen: false,
        };

        controller.surface.open_profile(&controller.record.name)?;
        controller.apply_static_config();
        controller.navigate_home();
        controller.window.show();

        Ok(controller)
    }

    fn apply_static_config(&mut self) {
        let settings = SurfaceSettings {
            javascript_enabled: self.record.enable_js,
            scroll_bars_hidden: self.record.hide_scroll_bars,
            user_agent: self.record.user_agent.clone(),
            background_color: self.record.background_color,
            proxy: self.record.proxy.clone(),
            audio_muted: self.record.mute_audio,
        };
        self.surface.apply_settings(&settings);
        self.surface.set_zoom_factor(self.record.zoom_level());

        for script in ScriptInjector::scripts_for(&self.record) {
            self.surface.add_startup_script(&script);
        }

        self.cookies
            .restore(&self.record, self.surface.cookie_store());

        self.window.set_frameless(self.record.remove_window_frame);
        self.window.set_min_size(BASELINE_MIN_SIZE);

        if let Some(icon) = &self.record.icon {
            self.window.set_icon(icon);
        }

        if let Some(geometry) = &self.record.window_geometry
            && !self.window.restore_geometry(geometry)
        {
            warn!(app = %self.record.name, "[Session] Stored window geometry is unusable, ignoring");
        }

        if self.record.lock_window_geometry {
            self.pin_window_size();
        }
    }

    fn navigate_home(&mut self) {
        self.load_state = LoadState::Loading;
        self.current_url = Some(self.start_url.clone());
        self.refresh_title();
        self.surface.navigate(&self.start_url);
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn record(&self) -> &AppRecord {
        &self.record
    }

    pub fn into_record(self) -> AppRecord {
        self.record
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_muted(&self) -> bool {
        self.record.mute_audio
    }

    pub fn is_geometry_locked(&self) -> bool {
        self.record.lock_window_geometry
    }

    /// The window title as currently composed.
    pub fn title(&self) -> String {
        compose_title(
            &self.base_title(),
            self.record.lock_window_geometry,
            self.record.mute_audio,
            self.load_state,
        )
    }

    // ============================================================================
    // Event dispatch
    // ============================================================================

    pub fn handle(&mut self, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Surface(e) => self.on_surface_event(e),
            SessionEvent::Window(e) => self.on_window_event(e),
            SessionEvent::Action(action) => return self.perform(action),
            SessionEvent::Timer(timer) => self.on_timer(timer),
            SessionEvent::RaiseRequested => {
                debug!(app = %self.record.name, "[Session] Raise requested");
                self.window.raise();
            }
            SessionEvent::CloseRequested => {
                self.close();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    pub fn perform(&mut self, action: WindowAction) -> Flow {
        debug!(app = %self.record.name, "[Session] Action: {}", action);
        match action {
            WindowAction::ToggleMute => self.toggle_mute(),
            WindowAction::GoBack => self.surface.go_back(),
            WindowAction::GoForward => self.surface.go_forward(),
            WindowAction::Reload => self.reload(),
            WindowAction::HardReload => self.hard_reload(),
            WindowAction::ToggleFullscreen => self.toggle_fullscreen(),
            WindowAction::StopOrExitFullscreen => self.stop_or_exit_fullscreen(),
            WindowAction::ToggleGeometryLock => self.toggle_geometry_lock(),
            WindowAction::ZoomIn => self.zoom_by(ZOOM_LEVEL_STEP),
            WindowAction::ZoomOut => self.zoom_by(-ZOOM_LEVEL_STEP),
            WindowAction::ZoomInFine => self.zoom_by(ZOOM_LEVEL_STEP_FINE),
            WindowAction::ZoomOutFine => self.zoom_by(-ZOOM_LEVEL_STEP_FINE),
            WindowAction::ZoomReset => self.zoom_by(0.0),
            WindowAction::Quit => {
                self.close();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    fn on_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::LoadStarted => {
                self.load_state = LoadState::Loading;
                self.refresh_title();
            }
            SurfaceEvent::LoadFinished { ok } => self.load_finished(ok),
            SurfaceEvent::UrlChanged(url) => self.current_url = Some(url),
            SurfaceEvent::TitleChanged(title) => {
                self.page_title = Some(title).filter(|t| !t.trim().is_empty());
                self.refresh_title();
            }
            SurfaceEvent::IconChanged(icon) => self.icon_changed(icon),
            SurfaceEvent::CookieAdded(cookie) => {
                self.cookies
                    .upsert(&mut self.record, self.store.as_ref(), cookie);
            }
            SurfaceEvent::CookieRemoved(cookie) => {
                self.cookies
                    .remove(&mut self.record, self.store.as_ref(), &cookie);
            }
            SurfaceEvent::NavigationRequested(attempt) => {
                if self.decide_navigation(&attempt) == NavigationDecision::Allow {
                    self.surface.proceed(&attempt);
                }
            }
        }
    }

    fn on_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Moved | WindowEvent::Resized => {
                if !self.fullscreen {
                    self.window
                        .start_timer(SessionTimer::SaveGeometry, self.config.geometry_save_delay);
                }
            }
            WindowEvent::ZoomWheel { delta } => {
                if delta > 0 {
                    self.zoom_by(ZOOM_LEVEL_STEP_FINE);
                } else if delta < 0 {
                    self.zoom_by(-ZOOM_LEVEL_STEP_FINE);
                }
            }
        }
    }

    fn on_timer(&mut self, timer: SessionTimer) {
        match timer {
            SessionTimer::FullscreenSettled => {
                if self.fullscreen {
                    return;
                }
                if self.record.lock_window_geometry {
                    self.pin_window_size();
                } else {
                    self.unpin_window_size();
                }
            }
            SessionTimer::SaveGeometry => {
                if !self.fullscreen {
                    self.save_geometry("window geometry");
                }
            }
        }
    }

    // ============================================================================
    // Load lifecycle
    // ============================================================================

    fn load_finished(&mut self, ok: bool) {
        let forgiven = std::mem::take(&mut self.forgive_next_error);

        self.load_state = if ok || forgiven {
            LoadState::LoadedOk
        } else {
            warn!(app = %self.record.name, "[Session] Page failed to load");
            LoadState::LoadedError
        };
        self.refresh_title();
    }

    pub fn reload(&mut self) {
        self.load_state = LoadState::Loading;
        self.refresh_title();
        self.surface.reload();
    }

    /// Reloads as if the app had just been launched.
    ///
    /// The current document is dropped synchronously, and an error from the
    /// next load is forgiven once.
    pub fn hard_reload(&mut self) {
        info!(app = %self.record.name, "[Session] Hard reload");
        self.forgive_next_error = true;

        if !self.record.is_title_pinned() {
            self.page_title = None;
        }
        let placeholder = self.base_title();
        self.surface.clear_content(&placeholder);

        self.navigate_home();
    }

    fn stop_or_exit_fullscreen(&mut self) {
        if self.fullscreen {
            self.toggle_fullscreen();
        } else {
            self.surface.stop();
        }
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    /// Runs the navigation policy and performs a divert if it says so.
    pub fn decide_navigation(&mut self, attempt: &NavigationAttempt) -> NavigationDecision {
        let current_host = self
            .current_url
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_ascii_lowercase);

        let decision = self.navigation.decide(&NavigationRequest {
            current_host: current_host.as_deref(),
            url: &attempt.url,
            kind: attempt.kind,
            is_main_frame: attempt.is_main_frame,
            user_forced_external: attempt.user_forced_external,
        });

        match decision {
            NavigationDecision::Divert => {
                info!(app = %self.record.name, "[Session] Opening {} externally", attempt.url);
                self.surface.open_external(&attempt.url);
            }
            NavigationDecision::Block => {
                warn!(
                    app = %self.record.name,
                    "[Session] Blocked cross-host form submission to {}",
                    attempt.url
                );
            }
            NavigationDecision::Allow => {}
        }

        decision
    }

    // ============================================================================
    // Window state
    // ============================================================================

    pub fn toggle_fullscreen(&mut self) {
        if self.fullscreen {
            self.fullscreen = false;
            self.window.set_fullscreen(false);
            self.window.start_timer(
                SessionTimer::FullscreenSettled,
                self.config.fullscreen_settle_delay,
            );
        } else {
            if self.record.lock_window_geometry {
                self.unpin_window_size();
            }
            self.fullscreen = true;
            self.window.set_fullscreen(true);
        }
        self.refresh_title();
    }

    /// Pins or releases the window size. Ignored while fullscreen.
    pub fn toggle_geometry_lock(&mut self) {
        if self.fullscreen {
            debug!(app = %self.record.name, "[Session] Geometry lock unavailable in fullscreen");
            return;
        }

        self.record.lock_window_geometry = !self.record.lock_window_geometry;
        if self.record.lock_window_geometry {
            self.pin_window_size();
        } else {
            self.unpin_window_size();
        }

        self.store.save_or_warn(&self.record, "geometry lock");
        self.refresh_title();
    }

    fn pin_window_size(&mut self) {
        let size = self.window.size();
        self.window.set_min_size(size);
        self.window.set_max_size(Some(size));
    }

    fn unpin_window_size(&mut self) {
        self.window.set_min_size(BASELINE_MIN_SIZE);
        self.window.set_max_size(None);
    }

    fn save_geometry(&mut self, reason: &str) {
        self.record.window_geometry = Some(self.window.save_geometry());
        self.store.save_or_warn(&self.record, reason);
    }

    /// Adjusts the zoom factor; `0.0` resets it to 1.0.
    pub fn zoom_by(&mut self, delta: f64) {
        let target = if delta == 0.0 {
            1.0
        } else {
            clamp_zoom(self.record.zoom_level() + delta)
        };
        let applied = self.record.set_zoom_level(target);

        self.surface.set_zoom_factor(applied);
        self.store.save_or_warn(&self.record, "zoom level");
    }

    pub fn toggle_mute(&mut self) {
        self.record.mute_audio = !self.record.mute_audio;
        self.surface.set_audio_muted(self.record.mute_audio);
        self.store.save_or_warn(&self.record, "mute state");
        self.refresh_title();
    }

    fn icon_changed(&mut self, icon: Vec<u8>) {
        if icon.is_empty() {
            return;
        }
        self.window.set_icon(&icon);

        if std::mem::replace(&mut self.icon_event_seen, true) {
            return;
        }
        if self.record.icon.is_none() {
            self.record.icon = Some(icon);
            self.store.save_or_warn(&self.record, "icon");
        }
    }

    /// Saves final state. The close itself is always accepted.
    pub fn close(&mut self) {
        if !self.fullscreen {
            self.save_geometry("window geometry");
        }
        info!(app = %self.record.name, "[Session] Closed");
    }

    // ============================================================================
    // Title
    // ============================================================================

    fn base_title(&self) -> String {
        if let Some(title) = self.record.title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        self.page_title
            .clone()
            .unwrap_or_else(|| self.record.name.to_string())
    }

    fn refresh_title(&mut self) {
        let title = self.title();
        self.window.set_title(&title);
    }
}
