use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{OpenError, RangeError, ReadError, SourceError};
use super::reader::{DEFAULT_READ_CHUNK_SAMPLES, FrameReader, StreamSpec, WavFrameReader, chunk_frames};
use super::{ChannelValues, MAX_CHANNELS};

/// How an [`AudioSource`] reaches sample data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Whole file decoded into memory; queries are slice arithmetic.
    FullCache,
    /// Every query seeks and reads from the decoder.
    #[default]
    OnDemand,
}

/// Sample access strategy for the open file.
pub(super) enum SampleStore {
    FullCache(Arc<[f32]>),
    OnDemand,
}

impl SampleStore {
    fn mode(&self) -> AccessMode {
        match self {
            SampleStore::FullCache(_) => AccessMode::FullCache,
            SampleStore::OnDemand => AccessMode::OnDemand,
        }
    }

    fn frame(
        &self,
        reader: &mut dyn FrameReader,
        spec: &StreamSpec,
        index: usize,
    ) -> Result<ChannelValues, SourceError> {
        if index >= spec.total_frames {
            return Err(RangeError::Frame {
                index,
                total_frames: spec.total_frames,
            }
            .into());
        }
        let channels = spec.channel_count();
        match self {
            SampleStore::FullCache(cache) => {
                let start = index * channels;
                Ok(ChannelValues::from_frame(&cache[start..start + channels]))
            }
            SampleStore::OnDemand => {
                let mut buf = [0.0_f32; MAX_CHANNELS];
                reader.seek(index)?;
                let read = reader.read_frames(&mut buf[..channels], 1)?;
                if read != 1 {
                    return Err(ReadError::ShortRead {
                        expected: 1,
                        actual: read,
                    }
                    .into());
                }
                Ok(ChannelValues::from_frame(&buf[..channels]))
            }
        }
    }

    fn all_frames(
        &self,
        reader: &mut dyn FrameReader,
        spec: &StreamSpec,
        chunk_samples: usize,
    ) -> Result<Arc<[f32]>, ReadError> {
        match self {
            SampleStore::FullCache(cache) => Ok(Arc::clone(cache)),
            SampleStore::OnDemand => Ok(Arc::from(read_all(reader, spec, chunk_samples)?)),
        }
    }

    fn whole_file_peaks(&self, reader: &mut dyn FrameReader) -> Result<ChannelValues, ReadError> {
        match self {
            SampleStore::FullCache(cache) => {
                let mut peaks = ChannelValues::zeroed(reader.spec().channel_count());
                peaks.accumulate_abs_max(cache);
                Ok(peaks)
            }
            SampleStore::OnDemand => reader.whole_file_peaks(),
        }
    }
}

/// Sequential full-stream decode in fixed-size chunks.
fn read_all(
    reader: &mut dyn FrameReader,
    spec: &StreamSpec,
    chunk_samples: usize,
) -> Result<Vec<f32>, ReadError> {
    let channels = spec.channel_count().max(1);
    let chunk_frames = chunk_frames(chunk_samples, channels);
    let mut buf = vec![0.0_f32; chunk_frames * channels];
    let mut samples = Vec::with_capacity(spec.sample_len());
    reader.seek(0)?;
    loop {
        let read = reader.read_frames(&mut buf, chunk_frames)?;
        samples.extend_from_slice(&buf[..read * channels]);
        if read < chunk_frames {
            break;
        }
    }
    if samples.len() != spec.sample_len() {
        return Err(ReadError::ShortRead {
            expected: spec.total_frames,
            actual: samples.len() / channels,
        });
    }
    Ok(samples)
}

pub(super) struct AudioHandle {
    pub(super) path: PathBuf,
    pub(super) reader: Box<dyn FrameReader>,
    pub(super) spec: StreamSpec,
    pub(super) store: SampleStore,
}

/// Exclusive owner of one decode session and its optional in-memory cache.
///
/// Opening a new file always releases the previous handle and cache first.
/// Every query takes `&mut self` because on-demand reads move the decoder's
/// cursor; share an `AudioSource` only behind a single owner.
pub struct AudioSource {
    handle: Option<AudioHandle>,
    access_mode: AccessMode,
    chunk_samples: usize,
    generation: u64,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource {
    /// Create a source with no file open, in [`AccessMode::OnDemand`].
    pub fn new() -> Self {
        Self {
            handle: None,
            access_mode: AccessMode::OnDemand,
            chunk_samples: DEFAULT_READ_CHUNK_SAMPLES,
            generation: 0,
        }
    }

    /// Create a source and open `path` immediately.
    pub fn open_path(path: &Path) -> Result<Self, OpenError> {
        let mut source = Self::new();
        source.open(path)?;
        Ok(source)
    }

    /// Override the number of interleaved samples read per sequential chunk.
    pub fn with_chunk_samples(mut self, chunk_samples: usize) -> Self {
        self.chunk_samples = chunk_samples.max(1);
        self
    }

    /// Set the access mode used by the next open.
    ///
    /// An already open file keeps its current mode; use
    /// [`set_access_mode`](Self::set_access_mode) to switch it in place.
    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Open a WAV file, replacing whatever was open before.
    ///
    /// In [`AccessMode::FullCache`] the whole file is decoded before this
    /// returns.
    pub fn open(&mut self, path: &Path) -> Result<StreamSpec, OpenError> {
        self.close();
        let reader = WavFrameReader::open(path).map_err(|source| OpenError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        self.install(path.to_path_buf(), Box::new(reader))
    }

    /// Open an already constructed reader; `origin` names it in errors and logs.
    pub fn open_reader(
        &mut self,
        origin: impl Into<PathBuf>,
        reader: impl FrameReader + 'static,
    ) -> Result<StreamSpec, OpenError> {
        self.close();
        self.install(origin.into(), Box::new(reader))
    }

    fn install(
        &mut self,
        path: PathBuf,
        mut reader: Box<dyn FrameReader>,
    ) -> Result<StreamSpec, OpenError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(OpenError::Unreadable {
                path,
                source: hound::Error::FormatError("stream reports zero channels"),
            });
        }
        if spec.channel_count() > MAX_CHANNELS {
            return Err(OpenError::TooManyChannels {
                path,
                channels: spec.channels,
                max: MAX_CHANNELS as u16,
            });
        }
        let store = match self.access_mode {
            AccessMode::FullCache => {
                let samples = read_all(reader.as_mut(), &spec, self.chunk_samples)
                    .map_err(|source| OpenError::Cache {
                        path: path.clone(),
                        source,
                    })?;
                SampleStore::FullCache(Arc::from(samples))
            }
            AccessMode::OnDemand => SampleStore::OnDemand,
        };
        info!(
            "Opened {} ({} ch, {} Hz, {} frames, {:?})",
            path.display(),
            spec.channels,
            spec.sample_rate,
            spec.total_frames,
            self.access_mode
        );
        self.handle = Some(AudioHandle {
            path,
            reader,
            spec,
            store,
        });
        self.generation += 1;
        Ok(spec)
    }

    /// Release the decode handle and cache, if any.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Closed {}", handle.path.display());
            self.generation += 1;
        }
    }

    /// Token that changes whenever a file is opened or closed.
    ///
    /// Consumers holding data derived from the open file compare it to detect
    /// that the file behind this source was replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a file is currently open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Path (or origin label) of the open file.
    pub fn path(&self) -> Option<&Path> {
        self.handle.as_ref().map(|handle| handle.path.as_path())
    }

    /// Active access mode.
    pub fn access_mode(&self) -> AccessMode {
        self.handle
            .as_ref()
            .map(|handle| handle.store.mode())
            .unwrap_or(self.access_mode)
    }

    /// Switch between full caching and on-demand reads.
    ///
    /// Switching to [`AccessMode::FullCache`] blocks for a full sequential
    /// decode of the open file; this is the slowest call on the type. Switching
    /// to [`AccessMode::OnDemand`] frees the cache immediately. Without an open
    /// file only the preference for the next open is stored. On failure the
    /// previous mode stays in effect.
    pub fn set_access_mode(&mut self, mode: AccessMode) -> Result<(), SourceError> {
        if let Some(handle) = self.handle.as_mut() {
            match (mode, handle.store.mode()) {
                (AccessMode::FullCache, AccessMode::OnDemand) => {
                    let samples =
                        read_all(handle.reader.as_mut(), &handle.spec, self.chunk_samples)?;
                    debug!(
                        "Cached {} samples from {}",
                        samples.len(),
                        handle.path.display()
                    );
                    handle.store = SampleStore::FullCache(Arc::from(samples));
                }
                (AccessMode::FullCache, AccessMode::FullCache) => {}
                (AccessMode::OnDemand, _) => handle.store = SampleStore::OnDemand,
            }
        }
        self.access_mode = mode;
        Ok(())
    }

    /// Metadata of the open file.
    pub fn spec(&self) -> Result<StreamSpec, SourceError> {
        self.handle().map(|handle| handle.spec)
    }

    /// Total frames in the open file.
    pub fn total_frames(&self) -> Result<usize, SourceError> {
        self.spec().map(|spec| spec.total_frames)
    }

    /// Channel count of the open file (1 or 2).
    pub fn channel_count(&self) -> Result<usize, SourceError> {
        self.spec().map(|spec| spec.channel_count())
    }

    /// Sample rate of the open file in Hz.
    pub fn sample_rate(&self) -> Result<u32, SourceError> {
        self.spec().map(|spec| spec.sample_rate)
    }

    /// Duration of the open file in seconds.
    pub fn duration_seconds(&self) -> Result<f32, SourceError> {
        self.spec().map(|spec| spec.duration_seconds())
    }

    /// Values of the frame at `index`.
    pub fn frame(&mut self, index: usize) -> Result<ChannelValues, SourceError> {
        let AudioHandle {
            reader,
            spec,
            store,
            ..
        } = self.handle_mut()?;
        store.frame(reader.as_mut(), spec, index)
    }

    /// Every interleaved sample of the open file.
    ///
    /// Shares the cache in [`AccessMode::FullCache`]; otherwise decodes the
    /// whole file without retaining it.
    pub fn all_frames(&mut self) -> Result<Arc<[f32]>, SourceError> {
        let chunk_samples = self.chunk_samples;
        let AudioHandle {
            reader,
            spec,
            store,
            ..
        } = self.handle_mut()?;
        Ok(store.all_frames(reader.as_mut(), spec, chunk_samples)?)
    }

    /// Whole-file peak magnitude per channel.
    pub fn normalized_peaks(&mut self) -> Result<ChannelValues, SourceError> {
        let AudioHandle { reader, store, .. } = self.handle_mut()?;
        Ok(store.whole_file_peaks(reader.as_mut())?)
    }

    fn handle(&self) -> Result<&AudioHandle, SourceError> {
        self.handle.as_ref().ok_or(SourceError::NoFileOpen)
    }

    pub(super) fn handle_mut(&mut self) -> Result<&mut AudioHandle, SourceError> {
        self.handle.as_mut().ok_or(SourceError::NoFileOpen)
    }
}
