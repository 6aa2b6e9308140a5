mod error;
mod geometry;
mod peaks;
mod reader;
mod source;
#[cfg(test)]
mod test_wav;
mod view;
mod viewport;

pub use error::{OpenError, RangeError, ReadError, SourceError, ViewError};
pub use geometry::{
    ChannelLayout, DEFAULT_SAMPLE_MARKER_SPACING, DrawCommand, Lane, Point,
    full_resolution_geometry, overview_geometry, round_half_up,
};
pub use peaks::{PeakVector, Region, partition_regions};
pub use reader::{DEFAULT_READ_CHUNK_SAMPLES, FrameReader, StreamSpec, WavFrameReader};
pub use source::{AccessMode, AudioSource};
pub use view::{DrawList, WaveformView, ZoomDirection};
pub use viewport::{
    DEFAULT_OVERVIEW_TOGGLE_RATIO, DEFAULT_PADDING, RenderMode, ViewportModel, ViewportUpdate,
    scale_factor, target_mode,
};

/// Highest channel count an [`AudioSource`] accepts.
pub const MAX_CHANNELS: usize = 2;

/// One value per channel, for a single frame or a region peak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelValues {
    values: [f32; MAX_CHANNELS],
    channels: usize,
}

impl ChannelValues {
    /// All-zero values for `channels` channels (clamped to `1..=MAX_CHANNELS`).
    pub fn zeroed(channels: usize) -> Self {
        Self {
            values: [0.0; MAX_CHANNELS],
            channels: channels.clamp(1, MAX_CHANNELS),
        }
    }

    /// Copy one interleaved frame.
    pub fn from_frame(frame: &[f32]) -> Self {
        let mut values = Self::zeroed(frame.len());
        for (slot, sample) in values.values.iter_mut().zip(frame) {
            *slot = *sample;
        }
        values
    }

    /// Number of channels represented.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Value for `channel`, or `0.0` when the channel does not exist.
    pub fn get(&self, channel: usize) -> f32 {
        self.as_slice().get(channel).copied().unwrap_or(0.0)
    }

    /// Values as a slice of length [`channels`](Self::channels).
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.channels]
    }

    /// Largest value across channels.
    pub fn max(&self) -> f32 {
        self.as_slice()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Fold interleaved samples into a running per-channel `max(|sample|)`.
    pub(crate) fn accumulate_abs_max(&mut self, interleaved: &[f32]) {
        let channels = self.channels;
        for frame in interleaved.chunks_exact(channels) {
            for (peak, sample) in self.values.iter_mut().zip(frame) {
                *peak = peak.max(sample.abs());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_frame_keeps_channel_order() {
        let values = ChannelValues::from_frame(&[0.25, -0.5]);
        assert_eq!(values.channels(), 2);
        assert_eq!(values.as_slice(), &[0.25, -0.5]);
    }

    #[test]
    fn get_returns_zero_for_missing_channel() {
        let values = ChannelValues::from_frame(&[0.75]);
        assert_eq!(values.get(1), 0.0);
    }

    #[test]
    fn accumulate_abs_max_is_per_channel() {
        let mut peaks = ChannelValues::zeroed(2);
        peaks.accumulate_abs_max(&[0.1, -0.9, -0.4, 0.2]);
        assert_eq!(peaks.as_slice(), &[0.4, 0.9]);
        assert_eq!(peaks.max(), 0.9);
    }
}
