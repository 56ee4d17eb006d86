use crate::error::{DepotError, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber for an embedding process.
///
/// Events go to a daily-rolling file named after `component` under
/// `log_dir` (default: `~/.depot/logs`), and optionally to stderr. The
/// returned guard must stay alive for the process lifetime or buffered
/// log lines are dropped.
pub fn init_logging(
    component: &str,
    log_dir: Option<&Path>,
    to_stderr: bool,
) -> Result<WorkerGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir(),
    };
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        DepotError::Internal(format!(
            "Failed to create log directory {}: {e}",
            log_dir.display()
        ))
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    Ok(guard)
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".depot/logs")
}
