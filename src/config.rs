//! Persisted waveform settings stored as TOML under the app directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::Error as SerdeDeError};
use thiserror::Error;

use crate::app_dirs;
use crate::waveform::{
    AccessMode, DEFAULT_OVERVIEW_TOGGLE_RATIO, DEFAULT_PADDING, DEFAULT_READ_CHUNK_SAMPLES,
    DEFAULT_SAMPLE_MARKER_SPACING,
};

/// Default filename used to store the settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Rendering and file-access preferences.
///
/// Config keys: `padding`, `overview_toggle_ratio`, `sample_marker_spacing`,
/// `read_chunk_samples`, `access_mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSettings {
    /// Headroom fraction above the loudest peak, in `[0, 1)`.
    #[serde(default = "default_padding")]
    pub padding: f32,
    /// Overview mode is used while `width < total_frames / ratio`.
    #[serde(default = "default_overview_toggle_ratio")]
    pub overview_toggle_ratio: f64,
    /// Pixel spacing above which individual samples get markers.
    #[serde(default = "default_sample_marker_spacing")]
    pub sample_marker_spacing: f32,
    /// Interleaved samples per sequential read.
    #[serde(default = "default_read_chunk_samples")]
    pub read_chunk_samples: usize,
    #[serde(default = "default_access_mode")]
    pub access_mode: AccessMode,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            overview_toggle_ratio: default_overview_toggle_ratio(),
            sample_marker_spacing: default_sample_marker_spacing(),
            read_chunk_samples: default_read_chunk_samples(),
            access_mode: default_access_mode(),
        }
    }
}

impl WaveformSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.padding = clamp_padding(self.padding);
        if !self.overview_toggle_ratio.is_finite() || self.overview_toggle_ratio < 1.0 {
            self.overview_toggle_ratio = 1.0;
        }
        if !self.sample_marker_spacing.is_finite() || self.sample_marker_spacing < 0.0 {
            self.sample_marker_spacing = default_sample_marker_spacing();
        }
        self.read_chunk_samples = self.read_chunk_samples.max(1);
        self
    }
}

fn default_padding() -> f32 {
    DEFAULT_PADDING
}

fn default_overview_toggle_ratio() -> f64 {
    DEFAULT_OVERVIEW_TOGGLE_RATIO
}

fn default_sample_marker_spacing() -> f32 {
    DEFAULT_SAMPLE_MARKER_SPACING
}

fn default_read_chunk_samples() -> usize {
    DEFAULT_READ_CHUNK_SAMPLES
}

fn default_access_mode() -> AccessMode {
    AccessMode::FullCache
}

fn clamp_padding(padding: f32) -> f32 {
    if padding.is_finite() {
        padding.clamp(0.0, 0.99)
    } else {
        DEFAULT_PADDING
    }
}

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("No suitable config directory found")]
    NoConfigDir,
}

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the default location, returning defaults if missing.
pub fn load_or_default() -> Result<WaveformSettings, ConfigError> {
    load_settings_from(&config_path()?)
}

/// Persist settings to the default location.
pub fn save(settings: &WaveformSettings) -> Result<(), ConfigError> {
    save_settings_to_path(settings, &config_path()?)
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<WaveformSettings, ConfigError> {
    if !path.exists() {
        return Ok(WaveformSettings::default());
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source: SerdeDeError::custom(source),
    })?;
    toml::from_str(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(WaveformSettings::normalized)
}

/// Write settings to `path`, creating parent directories as needed.
pub fn save_settings_to_path(settings: &WaveformSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
