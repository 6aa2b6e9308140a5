//! Where `waveview` keeps its settings and logs.
//!
//! Everything lives in one `.waveview` folder under the OS config directory.
//! `WAVEVIEW_CONFIG_HOME` replaces the OS directory, which tests and portable
//! installs use.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the config base.
pub const APP_DIR_NAME: &str = ".waveview";
/// Environment variable replacing the OS config directory.
pub const CONFIG_HOME_ENV: &str = "WAVEVIEW_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("Neither WAVEVIEW_CONFIG_HOME nor an OS config directory is available")]
    NoBaseDir,
    #[error("Could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolved directory layout rooted at one `.waveview` folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Layout under the configured base (env override first, then the OS).
    pub fn resolve() -> Result<Self, AppDirError> {
        let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
        Ok(Self::under(&base))
    }

    /// Layout under an explicit base directory. Nothing is created yet.
    pub fn under(base: &Path) -> Self {
        Self {
            root: base.join(APP_DIR_NAME),
        }
    }

    /// The `.waveview` folder, created on demand.
    pub fn root(&self) -> Result<PathBuf, AppDirError> {
        create(&self.root)
    }

    /// The `logs` folder inside the root, created on demand.
    pub fn logs(&self) -> Result<PathBuf, AppDirError> {
        create(&self.root.join(LOGS_DIR_NAME))
    }
}

/// Return the root `.waveview` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    AppDirs::resolve()?.root()
}

/// Return the `logs` directory, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    AppDirs::resolve()?.logs()
}

fn create(path: &Path) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

fn config_base_dir() -> Option<PathBuf> {
    // An empty override counts as unset.
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}
