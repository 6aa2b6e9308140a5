use std::ops::Range;

use tracing::debug;

use super::peaks::PeakVector;

/// Spacing in pixels above which each sample also gets its own marker.
pub const DEFAULT_SAMPLE_MARKER_SPACING: f32 = 9.0;

/// Frames drawn past the right edge of the invalidated range.
const OVERSCAN_FRAMES: usize = 2;

/// Pixel position; `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One instruction for an external drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Line { from: Point, to: Point },
    Marker { at: Point },
}

/// Vertical band one channel is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lane {
    /// Row of the zero line.
    pub midpoint: usize,
    /// Pixels covered by a full-scale excursion.
    pub amplitude: usize,
}

impl Lane {
    /// Row for `value` after applying `scale`; positive values sit above the midpoint.
    pub fn y_for(&self, value: f32, scale: f32) -> f32 {
        self.midpoint as f32 - self.amplitude as f32 * value * scale
    }
}

/// Lane placement for a widget of a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    lanes: [Lane; 2],
    channels: usize,
}

impl ChannelLayout {
    /// Mono files get one lane through the middle; stereo files are split
    /// into an upper and a lower half.
    pub fn new(channels: usize, height: usize) -> Self {
        let half = height / 2;
        let quarter = height / 4;
        if channels >= 2 {
            Self {
                lanes: [
                    Lane {
                        midpoint: half - quarter,
                        amplitude: quarter,
                    },
                    Lane {
                        midpoint: half + quarter,
                        amplitude: quarter,
                    },
                ],
                channels: 2,
            }
        } else {
            let lane = Lane {
                midpoint: half,
                amplitude: half,
            };
            Self {
                lanes: [lane, lane],
                channels: 1,
            }
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes[..self.channels]
    }
}

/// `floor(value + 0.5)`.
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Vertical peak bars for every column in `columns` that has a peak.
pub fn overview_geometry(
    peaks: &PeakVector,
    layout: &ChannelLayout,
    scale: f32,
    columns: Range<usize>,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(columns.len() * layout.channels() * 2);
    for x in columns {
        let Some(column) = peaks.column(x) else {
            break;
        };
        let px = x as f32;
        for (lane, peak) in layout.lanes().iter().zip(column) {
            let mid = Point::new(px, lane.midpoint as f32);
            commands.push(DrawCommand::Line {
                from: mid,
                to: Point::new(px, lane.y_for(*peak, scale)),
            });
            commands.push(DrawCommand::Line {
                from: mid,
                to: Point::new(px, lane.y_for(-*peak, scale)),
            });
        }
    }
    debug!("Overview geometry: {} commands", commands.len());
    commands
}

/// Polyline through every frame under `columns`, plus per-sample markers
/// when frames are spaced further apart than `marker_spacing` pixels.
///
/// `samples` is interleaved with one channel per lane of `layout`.
pub fn full_resolution_geometry(
    samples: &[f32],
    layout: &ChannelLayout,
    width: usize,
    scale: f32,
    columns: Range<usize>,
    marker_spacing: f32,
) -> Vec<DrawCommand> {
    let channels = layout.channels();
    let total_frames = samples.len() / channels;
    if total_frames == 0 || width == 0 {
        return Vec::new();
    }
    let spacing = width as f32 / total_frames as f32;
    let draw_markers = spacing > marker_spacing;
    let frame_at = |column: usize| {
        let frame = (total_frames as f64 * column as f64 / width as f64) as usize;
        frame.min(total_frames)
    };
    let first = frame_at(columns.start).min(total_frames - 1);
    let last = (frame_at(columns.end) + OVERSCAN_FRAMES).min(total_frames);
    let x_at = |frame: usize| round_half_up(frame as f32 * spacing);

    let mut commands = Vec::new();
    for frame in first..last {
        let values = &samples[frame * channels..(frame + 1) * channels];
        let x = x_at(frame);
        for (channel, lane) in layout.lanes().iter().enumerate() {
            let at = Point::new(x, lane.y_for(values[channel], scale));
            if frame > first {
                let prev = samples[(frame - 1) * channels + channel];
                commands.push(DrawCommand::Line {
                    from: Point::new(x_at(frame - 1), lane.y_for(prev, scale)),
                    to: at,
                });
            }
            if draw_markers {
                commands.push(DrawCommand::Marker { at });
            }
        }
    }
    debug!(
        "Full-resolution geometry: frames {first}..{last}, spacing {spacing:.3}, {} commands",
        commands.len()
    );
    commands
}
