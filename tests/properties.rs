//! Property tests for the extractor and the mappers.

use proptest::prelude::*;

use hapticwave::audio::{AnalysisFrame, Side};
use hapticwave::features::{low_frequency_intensity, ChannelSample, FeatureExtractor, Features};
use hapticwave::params::{AnalysisParams, BlobParams, PulseParams, SwarmParams};
use hapticwave::visuals::{BlobRing, PulseField};

fn stereo(left: f32, right: f32) -> Features {
    Features {
        overall_intensity: ((left + right) / 2.0).clamp(0.0, 1.0),
        left: ChannelSample {
            intensity: left,
            sharpness: 0.0,
        },
        right: ChannelSample {
            intensity: right,
            sharpness: 0.0,
        },
        stereo: true,
        ..Features::default()
    }
}

proptest! {
    #[test]
    fn low_frequency_uses_leading_bins(spectrum in prop::collection::vec(0.0f32..=1.0, 0..64)) {
        let band = AnalysisParams::default().haptic_range(spectrum.len());
        let level = low_frequency_intensity(&spectrum, band);
        prop_assert!((0.0..=1.0).contains(&level));

        let n = spectrum.len().min(12);
        if n == 0 {
            prop_assert_eq!(level, 0.0);
        } else {
            let expected = spectrum[..n].iter().sum::<f32>() / n as f32;
            prop_assert!((level - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn extraction_is_total(
        time_domain in prop::collection::vec(any::<f32>(), 0..256),
        frequency_domain in prop::collection::vec(any::<f32>(), 0..64),
    ) {
        let extractor = FeatureExtractor::new(&AnalysisParams::default());
        let frame = AnalysisFrame::new(time_domain, frequency_domain);
        let f = extractor.extract_with_channels(&frame, None);

        prop_assert!((0.0..=1.0).contains(&f.overall_intensity));
        prop_assert!((0.0..=1.0).contains(&f.low_frequency_intensity));
        prop_assert!(f.left.sharpness.is_finite() && f.left.sharpness >= 0.0);
        prop_assert_eq!(f.left, f.right);
    }

    #[test]
    fn target_count_formula(intensity in -1.0f32..2.0) {
        let params = SwarmParams::default();
        let expected = 100 + (400.0 * intensity.clamp(0.0, 1.0)).floor() as usize;
        prop_assert_eq!(params.target_count(intensity), expected);
    }

    #[test]
    fn pulse_invariants_hold(levels in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 1..150)) {
        let params = PulseParams::default();
        let mut field = PulseField::new(params.clone());
        let mut radii = std::collections::HashMap::new();
        let mut retired = std::collections::HashSet::new();

        for (frame, (left, right)) in levels.iter().enumerate() {
            let frame = frame as u64;
            let features = stereo(*left, *right);
            let had_none = field.pulses().is_empty();
            let before: std::collections::HashSet<u64> =
                field.pulses().iter().map(|p| p.id).collect();

            field.update(&features, frame, 720.0);

            for side in Side::BOTH {
                prop_assert!(field.recent_count(side, frame) <= params.max_concurrent);
            }
            let alive: std::collections::HashSet<u64> =
                field.pulses().iter().map(|p| p.id).collect();
            retired.extend(before.difference(&alive).copied());

            for pulse in field.pulses() {
                prop_assert!(!retired.contains(&pulse.id));
                if let Some(prev) = radii.insert(pulse.id, pulse.radius) {
                    prop_assert!(pulse.radius > prev);
                }
            }

            // Empty field plus any signal always shows something
            if had_none && features.loudest_intensity() > 0.0 {
                prop_assert!(!field.pulses().is_empty());
            }
        }
    }

    #[test]
    fn quiet_empty_field_gets_exactly_one_pulse(
        left in 0.0f32..1.0,
        right in 0.0f32..1.0,
        frame in 0u64..60,
    ) {
        let params = PulseParams::default();
        prop_assume!(frame < params.idle_spawn_frames);
        // Both sides strictly below the spawn threshold
        let features = stereo(left * params.spawn_threshold, right * params.spawn_threshold);
        prop_assume!(features.loudest_intensity() > 0.0);

        let mut field = PulseField::new(params);
        field.update(&features, frame, 720.0);

        prop_assert_eq!(field.pulses().len(), 1);
        prop_assert_eq!(field.pulses()[0].side, features.louder_side());
    }

    #[test]
    fn blob_changes_boundedly(
        left in 0.0f32..1.0,
        right in 0.0f32..1.0,
        frame in 0u64..100_000,
    ) {
        let ring = BlobRing::new(BlobParams::default());
        let features = stereo(left, right);
        let spectrum = vec![0.5; 128];
        for vertex in 0..16 {
            let angle = vertex as f32 * 0.39;
            let a = ring.radius_at(angle, &features, &spectrum, frame, 720.0);
            let b = ring.radius_at(angle, &features, &spectrum, frame + 1, 720.0);
            prop_assert!((a - b).abs() < 0.05 * 720.0);
            prop_assert!(a >= 0.02 * 720.0);
        }
    }
}
