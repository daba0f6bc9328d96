use std::sync::{Arc, Mutex};
use std::time::Duration;

use liquid_application::{SessionRunner, TimerScheduler, event_channel};
use liquid_core::app::{AppConfigRepository, AppName, AppRecord, Cookie};
use liquid_core::error::{LiquidError, Result};
use liquid_core::script::StartupScript;
use liquid_core::session::{
    NavigationAttempt, SessionConfig, SessionEvent, SessionTimer, SessionWindowController,
    SurfaceEvent, WindowAction, WindowEvent,
};
use liquid_core::surface::{BrowsingSurface, LiveCookieStore, SurfaceSettings, WindowHost, WindowSize};
use liquid_infrastructure::{InstanceClaim, InstanceLock, LiquidPaths};
use tempfile::TempDir;
use url::Url;

#[derive(Default)]
struct NullSurface {
    navigations: Vec<String>,
}

impl LiveCookieStore for NullSurface {
    fn set_cookie(&mut self, _cookie: &Cookie, _origin: &Url) {}
    fn delete_cookie(&mut self, _cookie: &Cookie) {}
}

impl BrowsingSurface for NullSurface {
    fn open_profile(&mut self, _app: &AppName) -> Result<()> {
        Ok(())
    }
    fn apply_settings(&mut self, _settings: &SurfaceSettings) {}
    fn add_startup_script(&mut self, _script: &StartupScript) {}
    fn navigate(&mut self, url: &Url) {
        self.navigations.push(url.to_string());
    }
    fn proceed(&mut self, _attempt: &NavigationAttempt) {}
    fn reload(&mut self) {}
    fn go_back(&mut self) {}
    fn go_forward(&mut self) {}
    fn stop(&mut self) {}
    fn clear_content(&mut self, _placeholder_title: &str) {}
    fn set_zoom_factor(&mut self, _factor: f64) {}
    fn set_audio_muted(&mut self, _muted: bool) {}
    fn open_external(&mut self, _url: &Url) {}
    fn cookie_store(&mut self) -> &mut dyn LiveCookieStore {
        self
    }
}

struct TimedWindow {
    timers: TimerScheduler,
    raised: usize,
    title: String,
}

impl WindowHost for TimedWindow {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
    fn set_icon(&mut self, _icon: &[u8]) {}
    fn set_frameless(&mut self, _frameless: bool) {}
    fn restore_geometry(&mut self, _geometry: &[u8]) -> bool {
        true
    }
    fn save_geometry(&self) -> Vec<u8> {
        vec![0x0a, 0x0b]
    }
    fn size(&self) -> WindowSize {
        WindowSize::new(800, 600)
    }
    fn set_min_size(&mut self, _size: WindowSize) {}
    fn set_max_size(&mut self, _size: Option<WindowSize>) {}
    fn set_fullscreen(&mut self, _fullscreen: bool) {}
    fn raise(&mut self) {
        self.raised += 1;
    }
    fn start_timer(&mut self, timer: SessionTimer, delay: Duration) {
        self.timers.schedule(timer, delay);
    }
    fn show(&mut self) {}
}

#[derive(Default)]
struct CountingStore {
    saved: Mutex<Vec<AppRecord>>,
}

impl AppConfigRepository for CountingStore {
    fn load(&self, name: &AppName) -> Result<AppRecord> {
        Err(LiquidError::not_found(name.as_str()))
    }
    fn save(&self, record: &AppRecord) -> Result<()> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
    fn delete(&self, name: &AppName) -> Result<()> {
        Err(LiquidError::not_found(name.as_str()))
    }
    fn exists(&self, _name: &AppName) -> bool {
        false
    }
    fn list_names(&self) -> Result<Vec<AppName>> {
        Ok(Vec::new())
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        fullscreen_settle_delay: Duration::from_millis(10),
        geometry_save_delay: Duration::from_millis(30),
    }
}

fn launch(
    store: Arc<CountingStore>,
    timers: TimerScheduler,
) -> SessionWindowController<NullSurface, TimedWindow> {
    let record = AppRecord::new(AppName::new("mail").unwrap(), "https://mail.example/");
    let window = TimedWindow {
        timers,
        raised: 0,
        title: String::new(),
    };
    SessionWindowController::launch(record, store, NullSurface::default(), window, fast_config())
        .unwrap()
}

#[tokio::test]
async fn test_quit_action_ends_loop_and_saves_geometry() {
    let store = Arc::new(CountingStore::default());
    let (tx, rx) = event_channel();
    let controller = launch(store.clone(), TimerScheduler::new(tx.clone()));

    tx.send(SessionEvent::Surface(SurfaceEvent::LoadFinished { ok: true }))
        .unwrap();
    tx.send(SessionEvent::Surface(SurfaceEvent::TitleChanged(
        "Inbox".to_string(),
    )))
    .unwrap();
    tx.send(SessionEvent::Action(WindowAction::Quit)).unwrap();

    let controller = SessionRunner::new(controller, rx, None).run().await;

    assert_eq!(controller.window().title, "Inbox");
    assert_eq!(controller.surface().navigations, vec!["https://mail.example/"]);
    let saved = store.saved.lock().unwrap();
    assert_eq!(
        saved.last().unwrap().window_geometry.as_deref(),
        Some(&[0x0a, 0x0b][..])
    );
}

#[tokio::test]
async fn test_closed_event_sources_close_session() {
    let store = Arc::new(CountingStore::default());
    let (tx, rx) = event_channel();
    let (timer_tx, _timer_rx) = event_channel();
    let controller = launch(store.clone(), TimerScheduler::new(timer_tx));
    drop(tx);

    let controller = SessionRunner::new(controller, rx, None).run().await;
    assert_eq!(controller.record().name.as_str(), "mail");
    assert_eq!(store.saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_resize_burst_saves_geometry_once() {
    let store = Arc::new(CountingStore::default());
    let (driver, rx) = event_channel();
    let controller = launch(store.clone(), TimerScheduler::new(driver.clone()));

    let feeder = tokio::spawn(async move {
        for _ in 0..5 {
            driver
                .send(SessionEvent::Window(WindowEvent::Resized))
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
        driver
            .send(SessionEvent::Action(WindowAction::Quit))
            .unwrap();
    });

    let _controller = SessionRunner::new(controller, rx, None).run().await;
    feeder.await.unwrap();

    // One debounced save plus the save on close.
    assert_eq!(store.saved.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_raise_request_from_second_instance() {
    let temp_dir = TempDir::new().unwrap();
    let paths = LiquidPaths::with_root(temp_dir.path());
    let name = AppName::new("mail").unwrap();

    let InstanceClaim::Primary(lock) = InstanceLock::claim(&paths, &name).unwrap() else {
        panic!("expected to own the instance");
    };
    assert!(matches!(
        InstanceLock::claim(&paths, &name).unwrap(),
        InstanceClaim::Secondary
    ));

    let store = Arc::new(CountingStore::default());
    let (tx, rx) = event_channel();
    let controller = launch(store, TimerScheduler::new(tx.clone()));

    let quitter = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(SessionEvent::Action(WindowAction::Quit)).unwrap();
    });

    let controller = SessionRunner::new(controller, rx, Some(lock))
        .with_raise_poll(Duration::from_millis(5))
        .run()
        .await;
    quitter.await.unwrap();

    assert_eq!(controller.window().raised, 1);
    // The lock was released with the loop.
    assert!(!paths.raise_file(&name).exists());
    assert!(matches!(
        InstanceLock::claim(&paths, &name).unwrap(),
        InstanceClaim::Primary(_)
    ));
}
