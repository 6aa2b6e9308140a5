use std::sync::Arc;

use tracing::{debug, info};

use super::ChannelValues;
use super::error::SourceError;
use super::peaks::PeakVector;
use super::source::AudioSource;

/// Widget width is compared against `total_frames / ratio` to pick a mode.
pub const DEFAULT_OVERVIEW_TOGGLE_RATIO: f64 = 100.0;
/// Fraction of headroom left above the loudest excursion.
pub const DEFAULT_PADDING: f32 = 0.3;

/// Active rendering strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// No file has been laid out since the last reset.
    #[default]
    Uninitialized,
    /// One pre-aggregated peak per pixel column.
    Overview,
    /// Every sample in view is drawn.
    FullResolution,
}

/// Mode for a widget `width` pixels wide showing `total_frames` frames.
pub fn target_mode(width: usize, total_frames: usize, toggle_ratio: f64) -> RenderMode {
    if (width as f64) < total_frames as f64 / toggle_ratio {
        RenderMode::Overview
    } else {
        RenderMode::FullResolution
    }
}

/// Vertical scale mapping the whole-file `peak` to `1 - padding` of a lane.
///
/// A silent file (peak of zero) is treated as full scale.
pub fn scale_factor(peak: f32, padding: f32) -> f32 {
    let inverse = if peak > 0.0 && peak.is_finite() {
        1.0 / peak
    } else {
        1.0
    };
    inverse - padding * inverse
}

/// Work performed by one [`ViewportModel::on_viewport_change`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportUpdate {
    /// Mode after the update.
    pub mode: RenderMode,
    /// Whether the mode differs from the previous one.
    pub mode_changed: bool,
    /// Whether the peak vector was rebuilt.
    pub peaks_recomputed: bool,
    /// Whether the full sample buffer was loaded.
    pub samples_loaded: bool,
}

/// Tracks widget geometry and the derived data each render mode needs.
///
/// Holds no audio handle; the peak vector and sample buffer can be dropped and
/// rebuilt from the [`AudioSource`] at any time.
#[derive(Clone, Debug)]
pub struct ViewportModel {
    width: usize,
    last_width: Option<usize>,
    mode: RenderMode,
    toggle_ratio: f64,
    padding: f32,
    peaks: PeakVector,
    samples: Arc<[f32]>,
    scale_factor: Option<f32>,
    source_generation: Option<u64>,
}

impl Default for ViewportModel {
    fn default() -> Self {
        Self::new(DEFAULT_OVERVIEW_TOGGLE_RATIO, DEFAULT_PADDING)
    }
}

impl ViewportModel {
    /// Create an uninitialized model.
    pub fn new(toggle_ratio: f64, padding: f32) -> Self {
        Self {
            width: 0,
            last_width: None,
            mode: RenderMode::Uninitialized,
            toggle_ratio,
            padding,
            peaks: PeakVector::default(),
            samples: Arc::from(Vec::new()),
            scale_factor: None,
            source_generation: None,
        }
    }

    /// Re-evaluate the render mode for `width` and rebuild whatever it needs.
    ///
    /// Entering or staying in overview with a new width recomputes the scale
    /// factor and every column peak. Entering full resolution loads all
    /// samples once. A different file behind `source` (see
    /// [`AudioSource::generation`]) counts as a fresh start from
    /// [`RenderMode::Uninitialized`]. On error the model keeps its previous
    /// state.
    pub fn on_viewport_change(
        &mut self,
        source: &mut AudioSource,
        width: usize,
    ) -> Result<ViewportUpdate, SourceError> {
        let total_frames = source.total_frames()?;
        let generation = source.generation();
        let file_changed = self.source_generation != Some(generation);
        let (previous_mode, last_width, previous_scale) = if file_changed {
            (RenderMode::Uninitialized, None, None)
        } else {
            (self.mode, self.last_width, self.scale_factor)
        };
        let target = target_mode(width, total_frames, self.toggle_ratio);
        let mode_changed = target != previous_mode;
        let width_changed = last_width != Some(width);
        let mut update = ViewportUpdate {
            mode: target,
            mode_changed,
            ..ViewportUpdate::default()
        };

        match target {
            RenderMode::Overview if mode_changed || width_changed => {
                let scale = self.whole_file_scale(source)?;
                let peaks = source.peaks_for_width(width)?;
                self.scale_factor = Some(scale);
                self.peaks = peaks;
                self.samples = Arc::from(Vec::new());
                update.peaks_recomputed = true;
            }
            RenderMode::FullResolution if mode_changed => {
                let samples = source.all_frames()?;
                let scale = match previous_scale {
                    Some(scale) => scale,
                    None => {
                        let mut peaks = ChannelValues::zeroed(source.channel_count()?);
                        peaks.accumulate_abs_max(&samples);
                        scale_factor(peaks.max(), self.padding)
                    }
                };
                debug!("Loaded {} samples for full-resolution drawing", samples.len());
                self.scale_factor = Some(scale);
                self.samples = samples;
                self.peaks = PeakVector::default();
                update.samples_loaded = true;
            }
            _ => {}
        }

        if mode_changed {
            info!(
                "Render mode {previous_mode:?} -> {target:?} (width {width}, {total_frames} frames)"
            );
        }
        self.mode = target;
        self.width = width;
        self.last_width = Some(width);
        self.source_generation = Some(generation);
        Ok(update)
    }

    /// Drop every derived aggregate and return to [`RenderMode::Uninitialized`].
    pub fn reset(&mut self) {
        self.mode = RenderMode::Uninitialized;
        self.last_width = None;
        self.peaks = PeakVector::default();
        self.samples = Arc::from(Vec::new());
        self.scale_factor = None;
        self.source_generation = None;
    }

    fn whole_file_scale(&self, source: &mut AudioSource) -> Result<f32, SourceError> {
        let peak = source.normalized_peaks()?.max();
        Ok(scale_factor(peak, self.padding))
    }

    /// Current render mode.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Width seen by the last update.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Overview peaks; empty outside [`RenderMode::Overview`].
    pub fn peak_vector(&self) -> &PeakVector {
        &self.peaks
    }

    /// Interleaved samples; empty outside [`RenderMode::FullResolution`].
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Scale factor from the last whole-file peak computation.
    pub fn scale_factor(&self) -> Option<f32> {
        self.scale_factor
    }

    /// Padding fraction used for the scale factor.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Width-to-frames ratio at which overview mode kicks in.
    pub fn toggle_ratio(&self) -> f64 {
        self.toggle_ratio
    }
}
