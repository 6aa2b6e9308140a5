use std::path::Path;

pub fn write_test_wav(path: &Path, channels: u16, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

pub fn write_test_wav_i16(path: &Path, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Mono ramp where region `i` of `region_len` frames peaks at `peaks[i]`.
pub fn regional_peaks(peaks: &[f32], region_len: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(peaks.len() * region_len);
    for &peak in peaks {
        for i in 0..region_len {
            let t = i as f32 / (region_len - 1).max(1) as f32;
            samples.push(peak * (t * 2.0 - 1.0));
        }
    }
    samples
}
