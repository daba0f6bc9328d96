//! The per-process session event loop.
//!
//! Every state transition of a session happens on the task that runs
//! [`SessionRunner::run`]. Engine backends, timers and the raise poll only
//! produce [`SessionEvent`]s; the controller consumes them one at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use liquid_core::session::{Flow, SessionEvent, SessionTimer, SessionWindowController};
use liquid_core::surface::{BrowsingSurface, WindowHost};
use liquid_infrastructure::InstanceLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

pub const RAISE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Creates the queue that feeds a session.
pub fn event_channel() -> (EventSender, mpsc::UnboundedReceiver<SessionEvent>) {
    mpsc::unbounded_channel()
}

/// Delivers one-shot [`SessionTimer`]s back into the session queue.
///
/// Window hosts hold one of these to implement `WindowHost::start_timer`.
/// Scheduling a timer that is still pending restarts it, so a burst of
/// requests fires once.
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    events: EventSender,
    pending: Arc<Mutex<HashMap<SessionTimer, JoinHandle<()>>>>,
}

impl TimerScheduler {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedules `timer` to fire after `delay`.
    ///
    /// Must be called from within a Tokio runtime; outside one the timer is
    /// dropped with a warning.
    pub fn schedule(&self, timer: SessionTimer, delay: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("[SessionRunner] No runtime, dropping timer {:?}", timer);
            return;
        };
        let events = self.events.clone();
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may already be gone.
            let _ = events.send(SessionEvent::Timer(timer));
        });

        match self.pending.lock() {
            Ok(mut pending) => {
                if let Some(previous) = pending.insert(timer, task) {
                    previous.abort();
                }
            }
            Err(_) => warn!("[SessionRunner] Timer table poisoned, {:?} not debounced", timer),
        }
    }
}

pub struct SessionRunner<S: BrowsingSurface, W: WindowHost> {
    controller: SessionWindowController<S, W>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    lock: Option<InstanceLock>,
    raise_poll: Duration,
}

impl<S: BrowsingSurface, W: WindowHost> SessionRunner<S, W> {
    pub fn new(
        controller: SessionWindowController<S, W>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        lock: Option<InstanceLock>,
    ) -> Self {
        Self {
            controller,
            events,
            lock,
            raise_poll: RAISE_POLL_INTERVAL,
        }
    }

    pub fn with_raise_poll(mut self, interval: Duration) -> Self {
        self.raise_poll = interval;
        self
    }

    /// Runs until the session exits, then releases the instance lock.
    ///
    /// Ctrl-C and SIGTERM close the session the same way the window's close
    /// button does. When every sender is gone the session is closed as well.
    pub async fn run(mut self) -> SessionWindowController<S, W> {
        let app = self.controller.record().name.clone();
        info!(app = %app, "[SessionRunner] Event loop started");

        let mut raise_tick = tokio::time::interval(self.raise_poll);
        raise_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                received = self.events.recv() => match received {
                    Some(event) => event,
                    None => {
                        debug!(app = %app, "[SessionRunner] Event sources closed");
                        SessionEvent::CloseRequested
                    }
                },
                _ = raise_tick.tick() => {
                    match &self.lock {
                        Some(lock) if lock.take_raise_request() => SessionEvent::RaiseRequested,
                        _ => continue,
                    }
                }
                _ = &mut shutdown => {
                    info!(app = %app, "[SessionRunner] Termination signal received");
                    SessionEvent::CloseRequested
                }
            };

            if self.controller.handle(event) == Flow::Exit {
                break;
            }
        }

        drop(self.lock.take());
        info!(app = %app, "[SessionRunner] Event loop finished");
        self.controller
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[SessionRunner] Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("[SessionRunner] Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
