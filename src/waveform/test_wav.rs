//! In-memory fixtures shared by the waveform unit tests.

use std::io::Cursor;

use super::error::ReadError;
use super::reader::{FrameReader, StreamSpec, WavFrameReader};

pub(crate) fn float_wav_bytes(channels: u16, samples: &[f32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
        for &sample in samples {
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

pub(crate) fn float_wav_reader(channels: u16, samples: &[f32]) -> WavFrameReader<Cursor<Vec<u8>>> {
    WavFrameReader::from_reader(Cursor::new(float_wav_bytes(channels, samples)))
        .expect("decode wav fixture")
}

pub(crate) fn wav_reader_with_channels(channels: u16) -> WavFrameReader<Cursor<Vec<u8>>> {
    let samples = vec![0.0_f32; channels as usize * 4];
    float_wav_reader(channels, &samples)
}

/// Mono reader whose header promises more frames than it can deliver.
pub(crate) struct ShortReader {
    total_frames: usize,
    available: usize,
    position: usize,
}

impl ShortReader {
    pub(crate) fn new(total_frames: usize, available: usize) -> Self {
        Self {
            total_frames,
            available,
            position: 0,
        }
    }
}

impl FrameReader for ShortReader {
    fn spec(&self) -> StreamSpec {
        StreamSpec {
            channels: 1,
            sample_rate: 8_000,
            total_frames: self.total_frames,
        }
    }

    fn seek(&mut self, frame: usize) -> Result<(), ReadError> {
        self.position = frame;
        Ok(())
    }

    fn read_frames(&mut self, buf: &mut [f32], count: usize) -> Result<usize, ReadError> {
        let read = count
            .min(buf.len())
            .min(self.available.saturating_sub(self.position));
        for slot in &mut buf[..read] {
            *slot = 0.5;
        }
        self.position += read;
        Ok(read)
    }
}
