use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_dir};

/// Route `tracing` output to a daily log file; the terminal belongs to the UI.
///
/// Returns the writer guard, which must be held until exit so buffered lines
/// get flushed. Logging is best-effort: `None` means it stays off.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let dir = settings.dir.clone().or_else(default_log_dir)?;
    std::fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&dir, "spindeck.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = env::var("SPINDECK_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_new(&settings.filter).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .ok()?;

    Some(guard)
}
