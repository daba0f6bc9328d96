//! Turning an app name into something that can be shown.

use std::sync::Arc;

use anyhow::{Context, Result};
use liquid_core::app::{AppConfigRepository, AppName, AppRecord};
use liquid_infrastructure::{InstanceClaim, InstanceLock, LiquidPaths};
use tracing::{info, warn};

/// Interactive collaborator that creates a record for an unknown app.
///
/// Implementations save the new record through `store` themselves and return
/// the name the user settled on, which may differ from `requested`.
pub trait CreateFlow {
    /// Returns `Ok(None)` when the user cancels.
    fn create(
        &mut self,
        requested: &AppName,
        store: &dyn AppConfigRepository,
    ) -> Result<Option<AppName>>;
}

/// An app that is ready to launch, together with its instance lock.
#[derive(Debug)]
pub struct ReadyApp {
    pub record: AppRecord,
    pub lock: InstanceLock,
}

#[derive(Debug)]
pub enum LaunchOutcome {
    Ready(ReadyApp),
    /// Another process runs this app and has been asked to raise itself.
    AlreadyRunning(AppName),
    /// The create flow was dismissed.
    Cancelled,
}

/// Resolves app names against the config store.
pub struct LaunchCoordinator {
    store: Arc<dyn AppConfigRepository>,
    paths: LiquidPaths,
}

impl LaunchCoordinator {
    pub fn new(store: Arc<dyn AppConfigRepository>, paths: LiquidPaths) -> Self {
        Self { store, paths }
    }

    pub fn store(&self) -> Arc<dyn AppConfigRepository> {
        Arc::clone(&self.store)
    }

    /// Finds the record for `name`, running `create` when there is none.
    ///
    /// The instance lock is claimed before the store is read, so a second
    /// launch never opens a create prompt for an app that is already running.
    /// After a confirmed creation the name chosen by the user is resolved
    /// from scratch, lock included.
    ///
    /// # Errors
    ///
    /// A corrupt record, a lock failure or a failing create flow.
    pub fn resolve(&self, name: &AppName, create: &mut dyn CreateFlow) -> Result<LaunchOutcome> {
        let mut name = name.clone();

        loop {
            let lock = match InstanceLock::claim(&self.paths, &name)? {
                InstanceClaim::Primary(lock) => lock,
                InstanceClaim::Secondary => {
                    info!(app = %name, "[Launch] Instance already running");
                    return Ok(LaunchOutcome::AlreadyRunning(name));
                }
            };

            match self.store.load(&name) {
                Ok(record) => {
                    info!(app = %name, "[Launch] Found app record");
                    return Ok(LaunchOutcome::Ready(ReadyApp { record, lock }));
                }
                Err(e) if e.is_not_found() => {
                    info!(app = %name, "[Launch] No record, starting create flow");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Cannot launch '{}'", name));
                }
            }

            let chosen = create
                .create(&name, self.store.as_ref())
                .with_context(|| format!("Create flow for '{}' failed", name))?;

            // Release before claiming the chosen name, which may be the same.
            drop(lock);

            match chosen {
                Some(chosen) => {
                    if chosen != name {
                        info!(app = %chosen, requested = %name, "[Launch] Created under a different name");
                    }
                    name = chosen;
                }
                None => {
                    info!(app = %name, "[Launch] Create flow cancelled");
                    return Ok(LaunchOutcome::Cancelled);
                }
            }
        }
    }

    /// Securely removes the record for `name`.
    pub fn remove(&self, name: &AppName) -> Result<()> {
        match InstanceLock::claim(&self.paths, name)? {
            InstanceClaim::Primary(_lock) => {
                self.store
                    .delete(name)
                    .with_context(|| format!("Cannot remove '{}'", name))?;
                info!(app = %name, "[Launch] Removed app record");
                Ok(())
            }
            InstanceClaim::Secondary => {
                warn!(app = %name, "[Launch] Refusing to remove a running app");
                anyhow::bail!("'{}' is running; close it before removing", name)
            }
        }
    }
}
