use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use liquid_application::{
    LaunchCoordinator, LaunchOutcome, ReadyApp, SessionRunner, TimerScheduler, event_channel,
};
use liquid_core::app::{AppConfigRepository, AppName};
use liquid_core::session::SessionWindowController;
use liquid_infrastructure::{LiquidPaths, LiquidSettings, TomlAppConfigRepository};
use tracing::{info, warn};

mod create_prompt;
mod driver;
mod headless;
mod logging;

use create_prompt::{PromptCreateFlow, Terminal};
use headless::{HeadlessSurface, HeadlessWindow};

#[derive(Parser)]
#[command(name = "liquid")]
#[command(
    about = "Liquid - run websites as standalone apps with isolated sessions",
    long_about = None
)]
struct Cli {
    /// App to launch. Without it, the known apps are listed
    app_name: Option<String>,

    /// Securely delete an app's record
    #[arg(long, value_name = "APP_NAME", conflicts_with = "app_name")]
    remove: Option<String>,

    /// Configuration root (defaults to the platform config directory)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LiquidPaths::resolve(cli.config_dir)?;
    let settings_path = paths.settings_file();
    let (settings, settings_error) = match LiquidSettings::load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(e) => (LiquidSettings::default(), Some(e)),
    };

    let _log_guard = logging::init(&paths, &settings);
    if let Some(e) = settings_error {
        warn!(
            "[Main] Could not read {}: {}. Using defaults",
            settings_path.display(),
            e
        );
    }

    let store: Arc<dyn AppConfigRepository> =
        Arc::new(TomlAppConfigRepository::new(&paths, settings.erase_passes()));
    let coordinator = LaunchCoordinator::new(Arc::clone(&store), paths);

    if let Some(name) = cli.remove {
        let name = AppName::new(&name)?;
        coordinator.remove(&name)?;
        println!("{}", format!("Removed '{}'", name).green());
        return Ok(());
    }

    match cli.app_name {
        None => list_apps(store.as_ref()),
        Some(name) => launch(&coordinator, &AppName::new(&name)?, &settings),
    }
}

fn list_apps(store: &dyn AppConfigRepository) -> Result<()> {
    let names = store.list_names()?;
    if names.is_empty() {
        println!("{}", "No apps yet. Run `liquid <APP_NAME>` to create one.".bright_black());
        return Ok(());
    }
    for name in names {
        match store.load(&name) {
            Ok(record) => println!("{}  {}", name.to_string().bold(), record.url.bright_black()),
            Err(e) => println!("{}  {}", name.to_string().bold(), e.to_string().red()),
        }
    }
    Ok(())
}

fn launch(coordinator: &LaunchCoordinator, name: &AppName, settings: &LiquidSettings) -> Result<()> {
    let mut create = PromptCreateFlow::new(Terminal::new()?);

    match coordinator.resolve(name, &mut create)? {
        LaunchOutcome::Ready(ready) => run_session(ready, coordinator.store(), settings),
        LaunchOutcome::AlreadyRunning(name) => {
            println!("{}", format!("'{}' is already running", name).bright_black());
            Ok(())
        }
        LaunchOutcome::Cancelled => {
            println!("{}", "Cancelled".bright_black());
            Ok(())
        }
    }
}

fn run_session(
    ready: ReadyApp,
    store: Arc<dyn AppConfigRepository>,
    settings: &LiquidSettings,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the event loop")?;

    let config = settings.session_config();
    runtime.block_on(async move {
        let ReadyApp { record, lock } = ready;
        let name = record.name.clone();

        let (events, queue) = event_channel();
        let surface = HeadlessSurface::new(events.clone());
        let window = HeadlessWindow::new(TimerScheduler::new(events.clone()));

        let controller = SessionWindowController::launch(record, store, surface, window, config)
            .with_context(|| format!("Cannot open '{}'", name))?;

        println!(
            "{}",
            "Type a shortcut (e.g. Ctrl+M) or 'help'. Ctrl+Q or end of input quits.".bright_black()
        );
        driver::spawn(events);

        SessionRunner::new(controller, queue, Some(lock)).run().await;
        info!(app = %name, "[Main] Session ended");
        anyhow::Ok(())
    })
}
