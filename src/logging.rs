//! Tracing setup for the `waveview` binary.
//!
//! Each launch writes `waveview_<timestamp>.log` next to earlier runs and
//! mirrors events to stdout. File names sort chronologically, so pruning keeps
//! the last [`MAX_LOG_FILES`] by name.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Log files kept after pruning.
pub const MAX_LOG_FILES: usize = 10;
/// Filter directives read before falling back to `RUST_LOG`.
pub const FILTER_ENV: &str = "WAVEVIEW_LOG";
const LOG_FILE_PREFIX: &str = "waveview_";
const LOG_FILE_SUFFIX: &str = ".log";
const FILE_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const EVENT_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static FLUSH_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    Dir(#[from] AppDirError),
    #[error("Could not list log directory {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not create log file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not delete old log file {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not format log file timestamp: {0}")]
    Stamp(#[from] time::error::Format),
    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber, logging into the app's `logs` directory.
///
/// Returns the file this launch writes to. Callers treat an error as
/// "run without logging".
pub fn init() -> Result<PathBuf, LoggingError> {
    init_in(&app_dirs::logs_dir()?)
}

/// [`init`] with an explicit log directory. Later calls return the new file
/// name without reinstalling anything.
pub fn init_in(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    let file_name = log_file_name(local_now())?;
    let log_path = log_dir.join(&file_name);
    if FLUSH_GUARD.get().is_some() {
        return Ok(log_path);
    }
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::Create {
        path: log_dir.to_path_buf(),
        source,
    })?;
    File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|source| LoggingError::Create {
            path: log_path.clone(),
            source,
        })?;
    prune_logs(log_dir, MAX_LOG_FILES)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, &file_name));
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        EVENT_STAMP,
    );
    let subscriber = Registry::default()
        .with(env_filter())
        .with(fmt::layer().with_timer(timer.clone()))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = FLUSH_GUARD.set(guard);

    tracing::info!("Logging to {}", log_path.display());
    Ok(log_path)
}

/// Delete the oldest `waveview_*.log` files so at most `keep` remain.
///
/// Other files in the directory are left alone.
fn prune_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let listing = fs::read_dir(dir).map_err(|source| LoggingError::List {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<PathBuf> = listing
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_log_file(path))
        .collect();
    if logs.len() <= keep {
        return Ok(());
    }
    logs.sort();
    let excess = logs.len() - keep;
    for path in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Prune { path, source })?;
    }
    Ok(())
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX))
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!(
        "{LOG_FILE_PREFIX}{}{LOG_FILE_SUFFIX}",
        now.format(FILE_STAMP)?
    ))
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
