//! File logging driven by the global `logging` config section.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use nova_core::config::{ConfigStore, LogFormat};
use nova_core::settings::Settings;

/// Install the global subscriber.
///
/// Logs go to a file so command output stays clean. An unreadable config
/// falls back to the defaults; the command itself reports the error.
pub fn init(settings: &Settings, working_dir: &Path) -> anyhow::Result<()> {
    let logging = ConfigStore::new(settings, working_dir)
        .load()
        .map(|config| config.logging)
        .unwrap_or_default();
    if !logging.enabled {
        return Ok(());
    }

    let path = logging.resolved_log_file(settings);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.log_level.as_filter()));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init(),
    }
    .context("Failed to initialize logging")
}
