//! Time-domain window statistics.

use super::ChannelSample;

/// Replace NaN / infinity with 0
pub(crate) fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Mean absolute amplitude; an empty window yields 0
pub fn mean_abs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| finite_or_zero(*s).abs()).sum();
    finite_or_zero(sum / samples.len() as f32)
}

/// Largest absolute first difference between consecutive samples
pub fn max_delta(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .map(|pair| finite_or_zero(pair[1] - pair[0]).abs())
        .fold(0.0, f32::max)
}

/// Intensity and sharpness of one (already truncated) window
pub fn window_stats(samples: &[f32]) -> ChannelSample {
    ChannelSample {
        intensity: mean_abs(samples),
        sharpness: max_delta(samples),
    }
}
