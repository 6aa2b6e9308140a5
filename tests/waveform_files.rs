//! End-to-end behavior of the waveform core against WAV files on disk.

mod support;

use std::fs::OpenOptions;

use support::wav::{regional_peaks, write_test_wav, write_test_wav_i16};
use tempfile::tempdir;
use waveview::config::WaveformSettings;
use waveview::waveform::{
    AccessMode, AudioSource, DrawCommand, OpenError, RangeError, Region, RenderMode, SourceError,
    ViewportModel, WaveformView, ZoomDirection,
};

const KNOWN_PEAKS: [f32; 5] = [0.5, 0.1, 0.9, 0.25, 0.6];

fn open_source(path: &std::path::Path, mode: AccessMode) -> AudioSource {
    let mut source = AudioSource::new().with_access_mode(mode);
    source.open(path).expect("open wav");
    source
}

#[test]
fn thousand_frame_mono_file_in_overview() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    write_test_wav(&path, 1, &regional_peaks(&KNOWN_PEAKS, 200));

    for mode in [AccessMode::FullCache, AccessMode::OnDemand] {
        let mut source = open_source(&path, mode);
        let mut viewport = ViewportModel::default();

        let update = viewport.on_viewport_change(&mut source, 5).unwrap();

        assert_eq!(update.mode, RenderMode::Overview);
        let peaks = viewport.peak_vector();
        assert_eq!(peaks.columns(), 5);
        for (column, expected) in KNOWN_PEAKS.iter().enumerate() {
            let got = peaks.column(column).unwrap()[0];
            assert!((got - expected).abs() < 1e-6, "{mode:?} column {column}: {got}");
        }
    }
}

#[test]
fn thousand_frame_mono_file_in_full_resolution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    let samples = regional_peaks(&KNOWN_PEAKS, 200);
    write_test_wav(&path, 1, &samples);

    let mut source = open_source(&path, AccessMode::OnDemand);
    let mut viewport = ViewportModel::default();
    let update = viewport.on_viewport_change(&mut source, 50).unwrap();

    assert_eq!(update.mode, RenderMode::FullResolution);
    assert_eq!(viewport.samples(), &samples[..]);
}

#[test]
fn frame_past_end_is_range_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    write_test_wav(&path, 1, &vec![0.1; 1000]);

    let mut source = open_source(&path, AccessMode::OnDemand);

    assert!(source.frame(999).is_ok());
    assert!(matches!(
        source.frame(1000),
        Err(SourceError::Range(RangeError::Frame {
            index: 1000,
            total_frames: 1000
        }))
    ));
}

#[test]
fn three_channel_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("surround.wav");
    write_test_wav(&path, 3, &vec![0.0; 30]);

    let mut source = AudioSource::new();
    let err = source.open(&path).unwrap_err();

    assert!(matches!(
        err,
        OpenError::TooManyChannels {
            channels: 3,
            max: 2,
            ..
        }
    ));
    assert!(!source.is_open());
}

#[test]
fn missing_file_is_unreadable() {
    let dir = tempdir().unwrap();
    let mut source = AudioSource::new();

    let err = source.open(&dir.path().join("absent.wav")).unwrap_err();

    assert!(matches!(err, OpenError::Unreadable { .. }));
    assert!(err.to_string().contains("absent.wav"));
}

#[test]
fn truncated_file_surfaces_read_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    write_test_wav(&path, 1, &vec![0.4; 1000]);
    let mut source = open_source(&path, AccessMode::OnDemand);
    assert!(source.peak_for_region(Region::new(0, 100)).is_ok());

    // Sample data is the last chunk; drop the final 600 frames.
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    let len = file.metadata().unwrap().len();
    file.set_len(len - 600 * 4).unwrap();
    drop(file);

    assert!(matches!(
        source.peak_for_region(Region::new(500, 600)),
        Err(SourceError::Read(_))
    ));
    assert!(source.is_open());
}

#[test]
fn int16_stereo_file_reports_normalized_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_test_wav_i16(&path, 2, &[16_384, -8_192, -32_768, 4_096]);

    let mut source = open_source(&path, AccessMode::FullCache);

    assert_eq!(source.channel_count().unwrap(), 2);
    assert_eq!(source.sample_rate().unwrap(), 44_100);
    assert_eq!(source.frame(0).unwrap().as_slice(), &[0.5, -0.25]);
    assert_eq!(source.normalized_peaks().unwrap().as_slice(), &[1.0, 0.25]);
}

#[test]
fn access_modes_agree_on_every_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let samples: Vec<f32> = (0..20_000)
        .map(|i| ((i * 7919 % 2003) as f32 / 2003.0) - 0.5)
        .collect();
    write_test_wav(&path, 2, &samples);

    let mut cached = open_source(&path, AccessMode::FullCache);
    let mut on_demand = open_source(&path, AccessMode::OnDemand);

    for width in [1, 7, 64, 99] {
        assert_eq!(
            cached.peaks_for_width(width).unwrap(),
            on_demand.peaks_for_width(width).unwrap(),
            "width {width}"
        );
    }
}

#[test]
fn view_follows_zoom_through_both_modes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_test_wav(&path, 2, &regional_peaks(&[0.8; 8], 250));
    let mut view = WaveformView::open(WaveformSettings::default(), &path).unwrap();

    view.resize(4, 200).unwrap();
    let overview = view.render(0..4).unwrap();
    assert_eq!(overview.mode, RenderMode::Overview);
    assert_eq!(overview.commands.len(), 4 * 2 * 2);

    view.zoom(ZoomDirection::In).unwrap();
    view.zoom(ZoomDirection::In).unwrap();
    let detailed = view.render(0..view.width()).unwrap();
    assert_eq!(detailed.mode, RenderMode::FullResolution);
    assert!(
        detailed
            .commands
            .iter()
            .all(|command| matches!(command, DrawCommand::Line { .. }))
    );

    view.zoom(ZoomDirection::Out).unwrap();
    assert_eq!(view.render(0..8).unwrap().mode, RenderMode::Overview);
}
