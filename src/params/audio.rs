//! Audio analysis configuration and constants.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Where the per-channel feature window sits relative to the playhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowAnchor {
    /// `[pos, pos + window)`: direct buffer access, reads slightly ahead
    Lookahead,
    /// `[pos - window, pos)`: streaming analysis, only what has been heard
    Lookback,
}

/// Analyser configuration (modelled on a browser AnalyserNode)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// FFT window size (must be power of 2)
    /// Yields fft_size / 2 frequency bins and fft_size time-domain samples
    pub fft_size: usize,

    /// Spectral smoothing between frames (0 = none, 0.8 = AnalyserNode default)
    pub smoothing: f32,

    /// Magnitude mapped to 0.0 in the frequency frame (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to 1.0 in the frequency frame (dBFS)
    pub max_decibels: f32,

    /// Per-channel feature window (samples)
    pub channel_window: usize,

    /// Window placement for per-channel features
    pub window_anchor: WindowAnchor,

    /// Number of leading bins forming the haptic band
    /// 12 bins @ 44.1kHz / 2048 ≈ 0-258 Hz
    pub haptic_bins: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            channel_window: 512,
            window_anchor: WindowAnchor::Lookahead,
            haptic_bins: 12,
        }
    }
}

impl AnalysisParams {
    /// Bin range covered by the haptic band for a frame of `len` bins
    pub fn haptic_range(&self, len: usize) -> Range<usize> {
        0..self.haptic_bins.min(len)
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(format!(
                "FFT size must be a power of 2 (>= 32), got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!("Smoothing must be in [0, 1), got {}", self.smoothing));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        if self.channel_window == 0 {
            return Err("Channel window must be > 0".to_string());
        }
        Ok(())
    }
}
