//! Logging setup.
//!
//! Structured logging via `tracing`: a compact stdout layer always, plus an
//! optional file layer when a log path is configured. The level defaults to
//! INFO and is overridable with `RUST_LOG`.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive; dropping it flushes buffered log lines.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initializes the global tracing subscriber.
///
/// With `log_file` set, log lines are written both to stdout and to the
/// file (created along with its parent directory if needed, appended to
/// across restarts). Without it, stdout only.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the path has
/// no file name.
pub fn init_logging(log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name")
            })?;
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            Ok(LoggingGuard {
                _file_guard: Some(file_guard),
            })
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();

            Ok(LoggingGuard { _file_guard: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // The global subscriber can only be installed once per process, so these
    // tests cover the path handling rather than init_logging itself.

    #[test]
    fn test_bare_file_name_defaults_to_current_dir() {
        let path = PathBuf::from("railyard.log");
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        assert_eq!(dir, Path::new("."));
    }

    #[test]
    fn test_nested_path_splits_into_dir_and_name() {
        let path = PathBuf::from("logs/railyard.log");
        assert_eq!(path.parent(), Some(Path::new("logs")));
        assert_eq!(path.file_name().unwrap(), "railyard.log");
    }
}
