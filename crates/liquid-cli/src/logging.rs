//! Tracing bootstrap for the `liquid` binary.

use liquid_infrastructure::{LiquidPaths, LiquidSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "liquid.log";

/// Picks the filter: `RUST_LOG`, then the settings file, then `info`.
fn filter_for(settings: &LiquidSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber: stderr plus a daily log file.
///
/// The returned guard flushes the file writer and must live until exit.
/// When the log directory cannot be used, logging goes to stderr only.
pub fn init(paths: &LiquidPaths, settings: &LiquidSettings) -> Option<WorkerGuard> {
    let logs_dir = paths.logs_dir();
    let appender = std::fs::create_dir_all(&logs_dir)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(&logs_dir)
                .map_err(|e| e.to_string())
        });

    let (file_layer, guard, file_error) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let _ = tracing_subscriber::registry()
        .with(filter_for(settings))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    if let Some(e) = file_error {
        tracing::warn!("[Logging] No log file in {}: {}", logs_dir.display(), e);
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_filter_is_used() {
        let settings = LiquidSettings {
            log_filter: "liquid_core=debug".to_string(),
            ..Default::default()
        };
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(filter_for(&settings).to_string(), "liquid_core=debug");
        }
    }

    #[test]
    fn test_bad_settings_filter_falls_back() {
        let settings = LiquidSettings {
            log_filter: "liquid_core=loud".to_string(),
            ..Default::default()
        };
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(filter_for(&settings).to_string(), "info");
        }
    }
}
