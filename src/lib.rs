//! Waveform viewer core: audio access, peak aggregation, viewport mode
//! selection and draw-command geometry.
/// Application directory resolution.
pub mod app_dirs;
/// Persisted waveform settings.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// Audio access, peaks, viewport and geometry.
pub mod waveform;
