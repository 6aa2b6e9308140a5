use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::ChannelValues;
use super::error::ReadError;

/// Default number of interleaved samples pulled per sequential read.
pub const DEFAULT_READ_CHUNK_SAMPLES: usize = 1024;

/// Stream metadata reported by a [`FrameReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of frames (one sample per channel) in the stream.
    pub total_frames: usize,
}

impl StreamSpec {
    /// Channel count as a `usize`.
    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }

    /// Number of interleaved samples covering the whole stream.
    pub fn sample_len(&self) -> usize {
        self.total_frames.saturating_mul(self.channel_count())
    }

    /// Total duration in seconds.
    pub fn duration_seconds(&self) -> f32 {
        self.total_frames as f32 / self.sample_rate.max(1) as f32
    }
}

/// Frame-addressed decode capability consumed by [`AudioSource`](super::AudioSource).
///
/// Implementations never need to know about caching or regions; they only
/// move a read cursor and hand out interleaved, normalized samples.
pub trait FrameReader: Send {
    /// Stream metadata; constant for the lifetime of the reader.
    fn spec(&self) -> StreamSpec;

    /// Move the read cursor to `frame`.
    fn seek(&mut self, frame: usize) -> Result<(), ReadError>;

    /// Read up to `count` frames into `buf` as interleaved samples.
    ///
    /// Returns the number of whole frames written, which is smaller than
    /// `count` only at the end of the stream.
    fn read_frames(&mut self, buf: &mut [f32], count: usize) -> Result<usize, ReadError>;

    /// Peak magnitude per channel over the whole stream.
    ///
    /// A stream that ends before `spec().total_frames` is a
    /// [`ReadError::ShortRead`]. Leaves the cursor at the end of the stream.
    fn whole_file_peaks(&mut self) -> Result<ChannelValues, ReadError> {
        let spec = self.spec();
        let channels = spec.channel_count().max(1);
        let chunk_frames = chunk_frames(DEFAULT_READ_CHUNK_SAMPLES, channels);
        let mut buf = vec![0.0_f32; chunk_frames * channels];
        let mut peaks = ChannelValues::zeroed(channels);
        let mut total_read = 0usize;
        self.seek(0)?;
        loop {
            let read = self.read_frames(&mut buf, chunk_frames)?;
            peaks.accumulate_abs_max(&buf[..read * channels]);
            total_read += read;
            if read < chunk_frames {
                break;
            }
        }
        if total_read != spec.total_frames {
            return Err(ReadError::ShortRead {
                expected: spec.total_frames,
                actual: total_read,
            });
        }
        Ok(peaks)
    }
}

/// Whole frames that fit in a chunk of `chunk_samples` interleaved samples.
pub(crate) fn chunk_frames(chunk_samples: usize, channels: usize) -> usize {
    (chunk_samples / channels.max(1)).max(1)
}

/// [`FrameReader`] backed by a hound WAV decoder.
pub struct WavFrameReader<R> {
    reader: WavReader<R>,
    spec: StreamSpec,
    format: SampleFormat,
    int_scale: f32,
}

impl WavFrameReader<BufReader<File>> {
    /// Open a WAV file from disk.
    pub fn open(path: &Path) -> Result<Self, hound::Error> {
        Ok(Self::new(WavReader::open(path)?))
    }
}

impl<R: Read + Seek> WavFrameReader<R> {
    /// Wrap any seekable byte source holding a WAV stream.
    pub fn from_reader(inner: R) -> Result<Self, hound::Error> {
        Ok(Self::new(WavReader::new(inner)?))
    }

    fn new(reader: WavReader<R>) -> Self {
        let wav_spec = reader.spec();
        let spec = StreamSpec {
            channels: wav_spec.channels,
            sample_rate: wav_spec.sample_rate,
            total_frames: reader.duration() as usize,
        };
        let int_scale = (1i64 << wav_spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
        Self {
            reader,
            spec,
            format: wav_spec.sample_format,
            int_scale,
        }
    }
}

impl<R: Read + Seek + Send> FrameReader for WavFrameReader<R> {
    fn spec(&self) -> StreamSpec {
        self.spec
    }

    fn seek(&mut self, frame: usize) -> Result<(), ReadError> {
        let time = u32::try_from(frame).map_err(|_| ReadError::Seek {
            frame,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "frame index exceeds the WAV addressable range",
            ),
        })?;
        self.reader
            .seek(time)
            .map_err(|source| ReadError::Seek { frame, source })
    }

    fn read_frames(&mut self, buf: &mut [f32], count: usize) -> Result<usize, ReadError> {
        let channels = self.spec.channel_count().max(1);
        let wanted = count.min(buf.len() / channels) * channels;
        let mut filled = 0usize;
        match self.format {
            SampleFormat::Float => {
                for (slot, sample) in buf[..wanted].iter_mut().zip(self.reader.samples::<f32>()) {
                    *slot = sample.map_err(|source| ReadError::Sample { source })?;
                    filled += 1;
                }
            }
            SampleFormat::Int => {
                let scale = self.int_scale;
                for (slot, sample) in buf[..wanted].iter_mut().zip(self.reader.samples::<i32>()) {
                    *slot = sample.map_err(|source| ReadError::Sample { source })? as f32 / scale;
                    filled += 1;
                }
            }
        }
        Ok(filled / channels)
    }
}
