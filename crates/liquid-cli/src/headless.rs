//! A browsing surface and window without a rendering engine.
//!
//! Every command is logged, and page loads are emulated by posting the
//! events a real engine would produce back into the session queue.

use std::time::Duration;

use colored::Colorize;
use liquid_application::{EventSender, TimerScheduler};
use liquid_core::app::{AppName, Cookie};
use liquid_core::error::Result;
use liquid_core::script::StartupScript;
use liquid_core::navigation::NavigationKind;
use liquid_core::session::{NavigationAttempt, SessionEvent, SessionTimer, SurfaceEvent};
use liquid_core::surface::{
    BrowsingSurface, LiveCookieStore, SurfaceSettings, WindowHost, WindowSize,
};
use tracing::{debug, info};
use url::Url;

const DEFAULT_SIZE: WindowSize = WindowSize::new(1024, 768);

#[derive(Debug, Default)]
pub struct HeadlessCookieStore {
    cookies: Vec<(Cookie, Url)>,
}

impl LiveCookieStore for HeadlessCookieStore {
    fn set_cookie(&mut self, cookie: &Cookie, origin: &Url) {
        debug!("[Headless] Set cookie {} for {}", cookie.storage_key(), origin);
        self.cookies.retain(|(c, _)| c.id() != cookie.id());
        self.cookies.push((cookie.clone(), origin.clone()));
    }

    fn delete_cookie(&mut self, cookie: &Cookie) {
        debug!("[Headless] Delete cookie {}", cookie.storage_key());
        self.cookies.retain(|(c, _)| c.id() != cookie.id());
    }
}

pub struct HeadlessSurface {
    events: EventSender,
    history: Vec<Url>,
    position: usize,
    cookies: HeadlessCookieStore,
}

impl HeadlessSurface {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            history: Vec::new(),
            position: 0,
            cookies: HeadlessCookieStore::default(),
        }
    }

    pub fn current_url(&self) -> Option<&Url> {
        self.history.get(self.position)
    }

    fn post(&self, event: SurfaceEvent) {
        // A closed queue means the session is over.
        let _ = self.events.send(SessionEvent::Surface(event));
    }

    /// Pushes `url` as the newest history entry, dropping forward history.
    fn commit(&mut self, url: &Url) {
        if !self.history.is_empty() {
            self.history.truncate(self.position + 1);
        }
        self.history.push(url.clone());
        self.position = self.history.len() - 1;
        self.emulate_load();
    }

    fn emulate_load(&self) {
        let Some(url) = self.current_url().cloned() else {
            return;
        };
        self.post(SurfaceEvent::LoadStarted);
        self.post(SurfaceEvent::UrlChanged(url.clone()));
        if let Some(host) = url.host_str() {
            self.post(SurfaceEvent::TitleChanged(host.to_string()));
        }
        self.post(SurfaceEvent::LoadFinished { ok: true });
    }
}

impl BrowsingSurface for HeadlessSurface {
    fn open_profile(&mut self, app: &AppName) -> Result<()> {
        info!(app = %app, "[Headless] Opened isolated profile");
        Ok(())
    }

    fn apply_settings(&mut self, settings: &SurfaceSettings) {
        info!(
            "[Headless] Settings: js={} scrollbars_hidden={} muted={} proxy={}",
            settings.javascript_enabled,
            settings.scroll_bars_hidden,
            settings.audio_muted,
            settings.proxy.mode
        );
        if let Some(ua) = &settings.user_agent {
            info!("[Headless] User agent: {}", ua);
        }
        if let Some(color) = settings.background_color {
            info!("[Headless] Background: {}", color);
        }
    }

    fn add_startup_script(&mut self, script: &StartupScript) {
        info!(
            "[Headless] Startup script '{}' ({} bytes)",
            script.name,
            script.source.len()
        );
    }

    fn navigate(&mut self, url: &Url) {
        info!("[Headless] Navigate to {}", url);
        self.commit(url);
    }

    fn proceed(&mut self, attempt: &NavigationAttempt) {
        if !attempt.is_main_frame {
            debug!("[Headless] Sub-frame loads {}", attempt.url);
            return;
        }
        match attempt.kind {
            NavigationKind::Reload => self.emulate_load(),
            NavigationKind::BackForward => {
                match self.history.iter().position(|u| *u == attempt.url) {
                    Some(index) => {
                        self.position = index;
                        self.emulate_load();
                    }
                    None => self.commit(&attempt.url),
                }
            }
            _ => {
                info!("[Headless] Following {}", attempt.url);
                self.commit(&attempt.url);
            }
        }
    }

    fn reload(&mut self) {
        info!("[Headless] Reload");
        self.emulate_load();
    }

    fn go_back(&mut self) {
        if self.position == 0 {
            debug!("[Headless] No history to go back to");
            return;
        }
        self.position -= 1;
        info!("[Headless] Back");
        self.emulate_load();
    }

    fn go_forward(&mut self) {
        if self.position + 1 >= self.history.len() {
            debug!("[Headless] No history to go forward to");
            return;
        }
        self.position += 1;
        info!("[Headless] Forward");
        self.emulate_load();
    }

    fn stop(&mut self) {
        info!("[Headless] Stop");
    }

    fn clear_content(&mut self, placeholder_title: &str) {
        info!("[Headless] Cleared page, placeholder '{}'", placeholder_title);
    }

    fn set_zoom_factor(&mut self, factor: f64) {
        info!("[Headless] Zoom {:.3}", factor);
    }

    fn set_audio_muted(&mut self, muted: bool) {
        info!("[Headless] Audio muted: {}", muted);
    }

    fn open_external(&mut self, url: &Url) {
        println!("{} {}", "external:".bright_black(), url.as_str().underline());
        info!("[Headless] Handed {} to the system browser", url);
    }

    fn cookie_store(&mut self) -> &mut dyn LiveCookieStore {
        &mut self.cookies
    }
}

/// Window geometry is stored as width and height, big-endian.
pub struct HeadlessWindow {
    timers: TimerScheduler,
    title: String,
    size: WindowSize,
}

impl HeadlessWindow {
    pub fn new(timers: TimerScheduler) -> Self {
        Self {
            timers,
            title: String::new(),
            size: DEFAULT_SIZE,
        }
    }
}

fn encode_geometry(size: WindowSize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8);
    bytes.extend_from_slice(&size.width.to_be_bytes());
    bytes.extend_from_slice(&size.height.to_be_bytes());
    bytes
}

fn decode_geometry(bytes: &[u8]) -> Option<WindowSize> {
    let width: [u8; 4] = bytes.get(0..4)?.try_into().ok()?;
    let height: [u8; 4] = bytes.get(4..8)?.try_into().ok()?;
    if bytes.len() != 8 {
        return None;
    }
    let size = WindowSize::new(u32::from_be_bytes(width), u32::from_be_bytes(height));
    (size.width > 0 && size.height > 0).then_some(size)
}

impl WindowHost for HeadlessWindow {
    fn set_title(&mut self, title: &str) {
        if self.title != title {
            println!("{} {}", "title:".bright_black(), title.bold());
            self.title = title.to_string();
        }
    }

    fn set_icon(&mut self, icon: &[u8]) {
        debug!("[Headless] Icon ({} bytes)", icon.len());
    }

    fn set_frameless(&mut self, frameless: bool) {
        debug!("[Headless] Frameless: {}", frameless);
    }

    fn restore_geometry(&mut self, geometry: &[u8]) -> bool {
        match decode_geometry(geometry) {
            Some(size) => {
                self.size = size;
                true
            }
            None => false,
        }
    }

    fn save_geometry(&self) -> Vec<u8> {
        encode_geometry(self.size)
    }

    fn size(&self) -> WindowSize {
        self.size
    }

    fn set_min_size(&mut self, size: WindowSize) {
        debug!("[Headless] Min size {}x{}", size.width, size.height);
    }

    fn set_max_size(&mut self, size: Option<WindowSize>) {
        match size {
            Some(s) => debug!("[Headless] Max size {}x{}", s.width, s.height),
            None => debug!("[Headless] Max size unbounded"),
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        info!("[Headless] Fullscreen: {}", fullscreen);
    }

    fn raise(&mut self) {
        println!("{}", "raised to front".bright_black());
    }

    fn start_timer(&mut self, timer: SessionTimer, delay: Duration) {
        self.timers.schedule(timer, delay);
    }

    fn show(&mut self) {
        info!(
            "[Headless] Window shown at {}x{}",
            self.size.width, self.size.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_application::event_channel;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_navigate_emulates_a_load() {
        let (tx, mut rx) = event_channel();
        let mut surface = HeadlessSurface::new(tx);
        let url = Url::parse("https://mail.example/inbox").unwrap();

        surface.navigate(&url);

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Surface(SurfaceEvent::LoadStarted),
                SessionEvent::Surface(SurfaceEvent::UrlChanged(url)),
                SessionEvent::Surface(SurfaceEvent::TitleChanged("mail.example".to_string())),
                SessionEvent::Surface(SurfaceEvent::LoadFinished { ok: true }),
            ]
        );
    }

    #[test]
    fn test_history_navigation() {
        let (tx, mut rx) = event_channel();
        let mut surface = HeadlessSurface::new(tx);
        let a = Url::parse("https://a.example/").unwrap();
        let b = Url::parse("https://a.example/b").unwrap();
        let c = Url::parse("https://a.example/c").unwrap();

        surface.navigate(&a);
        surface.navigate(&b);
        surface.go_back();
        assert_eq!(surface.current_url(), Some(&a));
        surface.go_back();
        assert_eq!(surface.current_url(), Some(&a));

        surface.go_forward();
        assert_eq!(surface.current_url(), Some(&b));

        surface.go_back();
        surface.navigate(&c);
        surface.go_forward();
        assert_eq!(surface.current_url(), Some(&c));
        drain(&mut rx);
    }

    #[test]
    fn test_proceed_keeps_sub_frames_and_history_apart() {
        let (tx, mut rx) = event_channel();
        let mut surface = HeadlessSurface::new(tx);
        let a = Url::parse("https://a.example/").unwrap();
        let b = Url::parse("https://a.example/b").unwrap();
        surface.navigate(&a);
        surface.navigate(&b);
        drain(&mut rx);

        surface.proceed(&NavigationAttempt {
            url: Url::parse("https://ads.example/frame").unwrap(),
            kind: NavigationKind::LinkClicked,
            is_main_frame: false,
            user_forced_external: false,
        });
        assert_eq!(surface.current_url(), Some(&b));
        assert!(drain(&mut rx).is_empty());

        surface.proceed(&NavigationAttempt {
            url: a.clone(),
            kind: NavigationKind::BackForward,
            is_main_frame: true,
            user_forced_external: false,
        });
        assert_eq!(surface.current_url(), Some(&a));
        // Forward history survives a back step.
        assert_eq!(surface.history.len(), 2);
        drain(&mut rx);
    }

    #[test]
    fn test_cookie_store_replaces_same_identity() {
        let (tx, _rx) = event_channel();
        let mut surface = HeadlessSurface::new(tx);
        let origin = Url::parse("https://a.example/").unwrap();

        surface
            .cookie_store()
            .set_cookie(&Cookie::new("sid", "1", "a.example", "/"), &origin);
        surface
            .cookie_store()
            .set_cookie(&Cookie::new("sid", "2", "a.example", "/"), &origin);
        assert_eq!(surface.cookies.cookies.len(), 1);

        surface
            .cookie_store()
            .delete_cookie(&Cookie::new("sid", "", "a.example", "/"));
        assert!(surface.cookies.cookies.is_empty());
    }

    #[test]
    fn test_geometry_round_trip() {
        let (tx, _rx) = event_channel();
        let mut window = HeadlessWindow::new(TimerScheduler::new(tx));
        window.size = WindowSize::new(640, 480);

        let saved = window.save_geometry();
        let mut other = HeadlessWindow::new(window.timers.clone());
        assert!(other.restore_geometry(&saved));
        assert_eq!(other.size(), WindowSize::new(640, 480));

        assert!(!other.restore_geometry(&[1, 2, 3]));
        assert!(!other.restore_geometry(&[0; 8]));
    }
}
