//! File logging. The terminal belongs to the UI, so nothing is ever
//! written to stdout or stderr while the editor runs.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "markln.log";
pub const LOG_ENV: &str = "MARKLN_LOG";

/// Installs the global subscriber writing to `<dir>/markln.log`. The filter
/// comes from `MARKLN_LOG` and defaults to `info`. The returned guard must
/// live until exit so buffered lines are flushed.
pub fn init(dir: &Path) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Another subscriber is already installed; drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}
