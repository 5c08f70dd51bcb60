//! Structured logging setup and log-file housekeeping.
//!
//! Console output goes to stderr so table output on stdout stays clean;
//! a daily rolling file of JSON lines under the user data directory keeps
//! a history.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Maximum number of log files to retain.
pub const MAX_LOG_FILES: usize = 10;

const LOG_FILE_PREFIX: &str = "supervibe";
const FILE_FILTER: &str = "info,supervibe_pos_lib=debug";
const CONSOLE_FILTER: &str = "error";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Version string with the git revision the binary was built from.
pub fn about() -> String {
    format!(
        "{} {} ({}, {}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_SHA"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

pub fn get_log_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join("supervibe-pos").join("logs")
}

/// Keep only the newest `keep` log files in `dir`. Other files are left
/// alone. Returns how many files were removed.
pub fn prune_logs_in(dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .map(|e| {
            let modified = e
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(std::time::UNIX_EPOCH);
            (e.path(), modified)
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(keep) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to prune log file {}: {e}", path.display()),
        }
    }
    removed
}

/// Install the global subscriber: stderr console layer and a daily rolling
/// file, each with its own filter. The returned guard flushes the file
/// writer on drop and must live until the process exits.
pub fn init_logging() -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter_or(CONSOLE_FILTER));

    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        tracing_subscriber::registry().with(console_layer).init();
        warn!("File logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }
    // Prune old log files before setting up the appender
    prune_logs_in(&log_dir, MAX_LOG_FILES);

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter_or(FILE_FILTER));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Some(guard)
}
