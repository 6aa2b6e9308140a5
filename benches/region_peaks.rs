use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tempfile::tempdir;
use waveview::waveform::{AccessMode, AudioSource, Region};

const FRAMES: usize = 441_000;
const WIDTH: usize = 800;

fn write_fixture(path: &std::path::Path) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for i in 0..FRAMES * 2 {
        let sample = ((i * 7919) % 65_536) as i32 - 32_768;
        writer.write_sample(sample as i16).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

fn bench_region_peaks(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bench.wav");
    write_fixture(&path);

    let mut group = c.benchmark_group("peaks_for_width");
    for mode in [AccessMode::FullCache, AccessMode::OnDemand] {
        let mut source = AudioSource::new().with_access_mode(mode);
        source.open(&path).expect("open fixture");
        group.bench_function(BenchmarkId::from_parameter(format!("{mode:?}")), |b| {
            b.iter(|| source.peaks_for_width(black_box(WIDTH)).expect("peaks"));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("peak_for_region");
    for mode in [AccessMode::FullCache, AccessMode::OnDemand] {
        let mut source = AudioSource::new().with_access_mode(mode);
        source.open(&path).expect("open fixture");
        let region = Region::new(FRAMES / 3, FRAMES / 3 + FRAMES / WIDTH);
        group.bench_function(BenchmarkId::from_parameter(format!("{mode:?}")), |b| {
            b.iter(|| source.peak_for_region(black_box(region)).expect("peak"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_region_peaks);
criterion_main!(benches);
