use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening an audio file.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Failed to decode {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: hound::Error,
    },
    #[error("{path} has {channels} channels; at most {max} are supported")]
    TooManyChannels {
        path: PathBuf,
        channels: u16,
        max: u16,
    },
    #[error("Failed to cache {path}: {source}")]
    Cache { path: PathBuf, source: ReadError },
}

/// Out-of-bounds frame or region request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Frame {index} is out of range (total frames: {total_frames})")]
    Frame { index: usize, total_frames: usize },
    #[error("Region {start}..{end} is out of range (total frames: {total_frames})")]
    Region {
        start: usize,
        end: usize,
        total_frames: usize,
    },
}

/// Seek or read failure against an already-open handle.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to seek to frame {frame}: {source}")]
    Seek {
        frame: usize,
        source: std::io::Error,
    },
    #[error("Sample error: {source}")]
    Sample { source: hound::Error },
    #[error("Short read: expected {expected} frames, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Failure of a query against an [`AudioSource`](super::AudioSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No audio file is open")]
    NoFileOpen,
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Failure surfaced by the [`WaveformView`](super::WaveformView) facade.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
