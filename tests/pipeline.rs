//! End-to-end runs of the tick loop on synthetic tracks.

use std::collections::BTreeMap;
use std::path::Path;

use hapticwave::audio::{OfflineSource, PcmBuffer};
use hapticwave::params::VisualizerParams;
use hapticwave::render::Shape;
use hapticwave::visuals::ModeState;
use hapticwave::{Session, Side, VisualizationMode};

const SAMPLE_RATE: u32 = 44100;

fn square(frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect()
}

fn session_with(mode: VisualizationMode, channels: Vec<Vec<f32>>) -> Session<OfflineSource> {
    let mut session = Session::offline(VisualizerParams::default()).unwrap();
    session.set_mode(mode);
    let buffer = PcmBuffer::from_channels(channels, SAMPLE_RATE).unwrap();
    session.load_buffer(Path::new("synthetic.wav"), buffer).unwrap();
    session.play();
    session
}

#[test]
fn test_square_wave_spawns_on_both_sides() {
    let wave = square(SAMPLE_RATE as usize * 2);
    let mut session = session_with(VisualizationMode::Pulses, vec![wave.clone(), wave]);

    let mut sides = Vec::new();
    for _ in 0..2 {
        session.tick();
        let ModeState::Pulses(field) = session.state() else {
            panic!("expected pulses");
        };
        sides.extend(field.pulses().iter().map(|p| p.side));
    }
    assert!(sides.contains(&Side::Left));
    assert!(sides.contains(&Side::Right));
}

#[test]
fn test_square_wave_fills_swarm() {
    let wave = square(SAMPLE_RATE as usize * 2);
    let mut session = session_with(VisualizationMode::Swarm, vec![wave.clone(), wave]);

    let mut last = None;
    for _ in 0..5 {
        last = Some(session.tick());
    }
    let frame = last.unwrap();
    let features = session.last_features().unwrap();
    assert!((features.overall_intensity - 1.0).abs() < 1e-3);
    let Some(Shape::Swarm { particles }) = &frame.shape else {
        panic!("expected swarm shape");
    };
    assert_eq!(particles.len(), 500);
}

#[test]
fn test_silence_keeps_one_pulse_per_idle_period() {
    let silent = vec![0.0; SAMPLE_RATE as usize * 4];
    let mut session = session_with(VisualizationMode::Pulses, vec![silent.clone(), silent]);

    let mut spawned: BTreeMap<u64, (u64, f32)> = BTreeMap::new();
    for _ in 0..200 {
        let frame = session.tick();
        assert!(!frame.is_idle());
        let ModeState::Pulses(field) = session.state() else {
            panic!("expected pulses");
        };
        for pulse in field.pulses() {
            spawned
                .entry(pulse.id)
                .or_insert((pulse.created_at_frame, pulse.intensity));
        }
    }

    let frames: Vec<u64> = spawned.values().map(|(frame, _)| *frame).collect();
    assert_eq!(frames, vec![60, 120, 180]);
    assert!(spawned
        .values()
        .all(|(_, intensity)| (intensity - 0.045).abs() < 1e-6));
}

#[test]
fn test_mono_track_is_symmetric() {
    let tone: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| 0.6 * (i as f32 * 0.05).sin())
        .collect();
    let mut session = session_with(VisualizationMode::Blob, vec![tone]);

    for _ in 0..10 {
        session.tick();
    }
    let features = *session.last_features().unwrap();
    assert!(!features.stereo);
    assert_eq!(features.left, features.right);
    assert_eq!(features.left.intensity, features.overall_intensity);
    assert_eq!(features.asymmetry(), 0.0);
}

#[test]
fn test_track_end_goes_idle() {
    // Ten ticks of audio
    let wave = square(735 * 10);
    let mut session = session_with(VisualizationMode::Waveform, vec![wave.clone(), wave]);

    let active = (0..20).filter(|_| !session.tick().is_idle()).count();
    assert_eq!(active, 9);
}

#[test]
fn test_looping_track_keeps_running() {
    let wave = square(735 * 10);
    let mut session = session_with(VisualizationMode::Spectrum, vec![wave.clone(), wave]);
    session.set_loop(true);

    assert!((0..40).all(|_| !session.tick().is_idle()));
}

#[test]
fn test_frames_serialize_as_json_lines() {
    let wave = square(SAMPLE_RATE as usize);
    let mut session = session_with(VisualizationMode::Haptic, vec![wave.clone(), wave]);

    let mut lines = Vec::new();
    for _ in 0..3 {
        lines.push(serde_json::to_string(&session.tick()).unwrap());
    }
    for line in &lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["mode"], "haptic");
        assert_eq!(value["shape"]["kind"], "haptic");
        assert!(value["overlay"]["intensity_bar_width"].is_number());
    }
}
