//! Logging infrastructure for geowifi.
//!
//! Provides structured logging to a file and, optionally, to stderr:
//! - Writes to `~/.geowifi/geowifi.log` unless configured otherwise
//! - Stdout is left to the result table
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Logging options resolved from configuration and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingOptions {
    /// Log file path
    pub file: PathBuf,
    /// Force the debug level regardless of RUST_LOG
    pub debug: bool,
    /// Mirror events to stderr
    pub verbose: bool,
}

impl LoggingOptions {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            debug: false,
            verbose: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Filter directive used when RUST_LOG is unset or `--debug` is given.
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    fn split_path(&self) -> io::Result<(&Path, String)> {
        let file_name = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid log file path: {}", self.file.display()),
                )
            })?;
        let dir = match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Ok((dir, file_name.to_string()))
    }
}

/// Initialize logging system.
///
/// Creates the log directory if needed, appends to the log file through a
/// non-blocking writer, and optionally mirrors events to stderr. Call before
/// starting the async runtime so timestamps carry the local offset.
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns error if the log directory cannot be created
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (log_dir, log_file) = options.split_path()?;
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, &log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    // Local offset lookup only succeeds before other threads exist.
    let timer = OffsetTime::local_rfc_3339()
        .unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_timer(timer)
        .with_ansi(false);

    let stderr_layer = options.verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    let env_filter = if options.debug {
        EnvFilter::new(options.default_directive())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(options.default_directive()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let options = LoggingOptions::new("geowifi.log");
        assert_eq!(options.default_directive(), "info");
        assert_eq!(options.with_debug(true).default_directive(), "debug");
    }

    #[test]
    fn test_split_path_bare_file_name() {
        let options = LoggingOptions::new("geowifi.log");
        let (dir, name) = options.split_path().unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "geowifi.log");
    }

    #[test]
    fn test_split_path_nested() {
        let options = LoggingOptions::new("/var/log/geowifi/run.log");
        let (dir, name) = options.split_path().unwrap();
        assert_eq!(dir, Path::new("/var/log/geowifi"));
        assert_eq!(name, "run.log");
    }

    #[test]
    fn test_split_path_rejects_directory_only() {
        let options = LoggingOptions::new("/");
        assert!(options.split_path().is_err());
    }
}
