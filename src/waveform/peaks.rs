use tracing::{debug, warn};

use super::error::{RangeError, ReadError, SourceError};
use super::reader::{FrameReader, StreamSpec};
use super::source::{AudioHandle, AudioSource, SampleStore};
use super::ChannelValues;

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First frame in the region.
    pub start: usize,
    /// One past the last frame in the region.
    pub end: usize,
}

impl Region {
    /// Build a region from its bounds.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the region covers no frames.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `other` lies entirely inside this region.
    pub fn contains(&self, other: &Region) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Per-column, per-channel peak magnitudes for overview rendering.
///
/// Columns run left to right; the channels of one column are contiguous.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeakVector {
    channels: usize,
    values: Vec<f32>,
}

impl PeakVector {
    /// Empty vector for `channels` channels with room for `columns` columns.
    pub fn with_capacity(channels: usize, columns: usize) -> Self {
        let channels = channels.max(1);
        Self {
            channels,
            values: Vec::with_capacity(columns.saturating_mul(channels)),
        }
    }

    /// Append the next column.
    pub fn push(&mut self, peak: ChannelValues) {
        let slice = peak.as_slice();
        for channel in 0..self.channels {
            self.values.push(slice.get(channel).copied().unwrap_or(0.0));
        }
    }

    /// Channels per column.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.values.len() / self.channels
        }
    }

    /// Whether no column has been computed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Peaks of column `x`, one per channel.
    pub fn column(&self, x: usize) -> Option<&[f32]> {
        let start = x.checked_mul(self.channels)?;
        self.values.get(start..start + self.channels)
    }

    /// Flat column-major view of every value.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Split `[0, total_frames)` into `width` contiguous regions of
/// `total_frames / width` frames; the last region absorbs the remainder.
pub fn partition_regions(total_frames: usize, width: usize) -> Vec<Region> {
    if width == 0 {
        return Vec::new();
    }
    let step = total_frames / width;
    (0..width)
        .map(|column| {
            let start = column * step;
            let end = if column + 1 == width {
                total_frames
            } else {
                start + step
            };
            Region::new(start, end)
        })
        .collect()
}

impl SampleStore {
    fn region_peak(
        &self,
        reader: &mut dyn FrameReader,
        spec: &StreamSpec,
        region: Region,
    ) -> Result<ChannelValues, SourceError> {
        if region.start > region.end || region.end > spec.total_frames {
            return Err(RangeError::Region {
                start: region.start,
                end: region.end,
                total_frames: spec.total_frames,
            }
            .into());
        }
        let channels = spec.channel_count();
        let mut peak = ChannelValues::zeroed(channels);
        if region.is_empty() {
            return Ok(peak);
        }
        match self {
            SampleStore::FullCache(cache) => {
                peak.accumulate_abs_max(&cache[region.start * channels..region.end * channels]);
            }
            SampleStore::OnDemand => {
                let frames = region.len();
                let mut chunk = vec![0.0_f32; frames * channels];
                reader.seek(region.start)?;
                let read = reader.read_frames(&mut chunk, frames)?;
                if read != frames {
                    return Err(ReadError::ShortRead {
                        expected: frames,
                        actual: read,
                    }
                    .into());
                }
                peak.accumulate_abs_max(&chunk);
            }
        }
        Ok(peak)
    }
}

impl AudioSource {
    /// Peak magnitude per channel over `region`.
    ///
    /// A degenerate region (`start == end`) yields `0.0` for every channel.
    /// In on-demand mode the region is read in one pass and discarded; a short
    /// read is an error and never a partial peak.
    pub fn peak_for_region(&mut self, region: Region) -> Result<ChannelValues, SourceError> {
        let AudioHandle {
            reader,
            spec,
            store,
            ..
        } = self.handle_mut()?;
        store.region_peak(reader.as_mut(), spec, region)
    }

    /// Peaks for `width` pixel columns tiling the whole file.
    pub fn peaks_for_width(&mut self, width: usize) -> Result<PeakVector, SourceError> {
        let spec = self.spec()?;
        let regions = partition_regions(spec.total_frames, width);
        let mut peaks = PeakVector::with_capacity(spec.channel_count(), regions.len());
        for region in regions {
            let peak = self
                .peak_for_region(region)
                .inspect_err(|err| warn!("Peak scan stopped at {region:?}: {err}"))?;
            peaks.push(peak);
        }
        debug!(
            "Computed {} peak columns over {} frames",
            peaks.columns(),
            spec.total_frames
        );
        Ok(peaks)
    }
}
