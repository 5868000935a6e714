//! Whole-frame features.

use std::ops::Range;

use super::window::{finite_or_zero, mean_abs};

/// Mean absolute amplitude over the whole time-domain frame, in [0, 1]
pub fn overall_intensity(time_domain: &[f32]) -> f32 {
    mean_abs(time_domain).clamp(0.0, 1.0)
}

/// Mean of the haptic `band` bins present in the frame, in [0, 1]
///
/// The default band is 12 bins, ≈ 0-258 Hz at 44.1kHz / 2048: the range
/// felt more than heard.
pub fn low_frequency_intensity(frequency_domain: &[f32], band: Range<usize>) -> f32 {
    let end = band.end.min(frequency_domain.len());
    let start = band.start.min(end);
    let bins = &frequency_domain[start..end];
    if bins.is_empty() {
        return 0.0;
    }
    let sum: f32 = bins.iter().map(|v| finite_or_zero(*v)).sum();
    finite_or_zero(sum / bins.len() as f32).clamp(0.0, 1.0)
}

/// Index of the strongest bin (first one on ties)
pub fn dominant_band(frequency_domain: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in frequency_domain.iter().enumerate() {
        let v = finite_or_zero(v);
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
