use std::ops::Range;
use std::path::Path;

use tracing::{info, warn};

use crate::config::WaveformSettings;

use super::error::ViewError;
use super::geometry::{ChannelLayout, DrawCommand, full_resolution_geometry, overview_geometry};
use super::reader::StreamSpec;
use super::source::{AccessMode, AudioSource};
use super::viewport::{RenderMode, ViewportModel, ViewportUpdate};

/// Geometry for one paint pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub mode: RenderMode,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Zoom step applied by [`WaveformView::zoom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Double the widget width.
    In,
    /// Halve the widget width.
    Out,
}

/// Waveform widget state minus the drawing surface.
///
/// Owns one [`AudioSource`] and one [`ViewportModel`]. The hosting UI reports
/// size changes through [`resize`](Self::resize) and asks for draw commands
/// with [`render`](Self::render).
pub struct WaveformView {
    settings: WaveformSettings,
    source: AudioSource,
    viewport: ViewportModel,
    width: usize,
    height: usize,
}

impl WaveformView {
    /// View with no file open and a zero-sized widget.
    pub fn new(settings: WaveformSettings) -> Self {
        let source = AudioSource::new()
            .with_chunk_samples(settings.read_chunk_samples)
            .with_access_mode(settings.access_mode);
        let viewport = ViewportModel::new(settings.overview_toggle_ratio, settings.padding);
        Self {
            settings,
            source,
            viewport,
            width: 0,
            height: 0,
        }
    }

    /// View showing `path`.
    pub fn open(settings: WaveformSettings, path: &Path) -> Result<Self, ViewError> {
        let mut view = Self::new(settings);
        view.reset_file(path)?;
        Ok(view)
    }

    /// Replace the displayed file.
    ///
    /// Every aggregate is dropped and the render mode is re-established from
    /// scratch. In [`AccessMode::FullCache`] this blocks until the whole file
    /// is decoded.
    pub fn reset_file(&mut self, path: &Path) -> Result<StreamSpec, ViewError> {
        self.viewport.reset();
        let spec = self.source.open(path)?;
        if self.width > 0 {
            self.viewport.on_viewport_change(&mut self.source, self.width)?;
        }
        Ok(spec)
    }

    /// Switch how the open file is read. See [`AudioSource::set_access_mode`].
    pub fn set_access_mode(&mut self, mode: AccessMode) -> Result<(), ViewError> {
        self.source.set_access_mode(mode)?;
        self.settings.access_mode = mode;
        info!("Access mode set to {mode:?}");
        Ok(())
    }

    pub fn access_mode(&self) -> AccessMode {
        self.source.access_mode()
    }

    /// Record a new widget size and update the render mode for it.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<ViewportUpdate, ViewError> {
        self.width = width;
        self.height = height;
        if !self.source.is_open() {
            return Ok(ViewportUpdate::default());
        }
        Ok(self.viewport.on_viewport_change(&mut self.source, width)?)
    }

    /// Double or halve the widget width, never going below one pixel.
    pub fn zoom(&mut self, direction: ZoomDirection) -> Result<ViewportUpdate, ViewError> {
        let width = match direction {
            ZoomDirection::In => self.width.saturating_mul(2),
            ZoomDirection::Out => self.width / 2,
        }
        .max(1);
        self.resize(width, self.height)
    }

    /// Draw commands for the invalidated pixel columns `columns`.
    pub fn render(&mut self, columns: Range<usize>) -> Result<DrawList, ViewError> {
        let spec = self.source.spec()?;
        if self.viewport.mode() == RenderMode::Uninitialized || self.viewport.width() != self.width
        {
            self.viewport
                .on_viewport_change(&mut self.source, self.width)
                .inspect_err(|err| warn!("Render aborted: {err}"))?;
        }
        let layout = ChannelLayout::new(spec.channel_count(), self.height);
        let mode = self.viewport.mode();
        let Some(scale) = self.viewport.scale_factor() else {
            return Ok(DrawList {
                mode,
                commands: Vec::new(),
            });
        };
        let commands = match mode {
            RenderMode::Overview => {
                overview_geometry(self.viewport.peak_vector(), &layout, scale, columns)
            }
            RenderMode::FullResolution => full_resolution_geometry(
                self.viewport.samples(),
                &layout,
                self.width,
                scale,
                columns,
                self.settings.sample_marker_spacing,
            ),
            RenderMode::Uninitialized => Vec::new(),
        };
        Ok(DrawList { mode, commands })
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    pub fn viewport(&self) -> &ViewportModel {
        &self.viewport
    }

    pub fn settings(&self) -> &WaveformSettings {
        &self.settings
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
