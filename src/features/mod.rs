//! Per-tick feature extraction.
//!
//! Turns the current playhead, raw channel PCM and one analyser frame into
//! the scalar features every visualization mode consumes. Extraction is
//! total: missing stereo data degrades to the mono mix, out-of-range windows
//! are truncated, and non-finite values become 0.

mod spectral;
mod window;

use serde::Serialize;

use crate::audio::{AnalysisFrame, AudioSource, Side};
use crate::params::{AnalysisParams, WindowAnchor};

pub use spectral::{dominant_band, low_frequency_intensity, overall_intensity};
pub use window::{max_delta, mean_abs, window_stats};

/// Per-channel features around the playhead
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChannelSample {
    /// Mean |x| over the window
    pub intensity: f32,
    /// Max |x[i] - x[i-1]| over the window
    pub sharpness: f32,
}

/// Everything the mapper needs from one tick of audio
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Features {
    pub overall_intensity: f32,
    pub left: ChannelSample,
    pub right: ChannelSample,
    /// Haptic band level in [0, 1]
    pub low_frequency_intensity: f32,
    pub dominant_band: Option<usize>,
    /// False when per-channel values are the mono fallback
    pub stereo: bool,
}

impl Features {
    pub fn channel(&self, side: Side) -> ChannelSample {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Side with the higher intensity (left on ties)
    pub fn louder_side(&self) -> Side {
        if self.right.intensity > self.left.intensity {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn loudest_intensity(&self) -> f32 {
        self.left.intensity.max(self.right.intensity)
    }

    /// Left minus right intensity; 0 for mono input
    pub fn asymmetry(&self) -> f32 {
        if self.stereo {
            self.left.intensity - self.right.intensity
        } else {
            0.0
        }
    }
}

/// Stateless feature extractor configured once per session
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    window: usize,
    anchor: WindowAnchor,
    analysis: AnalysisParams,
}

impl FeatureExtractor {
    pub fn new(params: &AnalysisParams) -> Self {
        Self {
            window: params.channel_window.max(1),
            anchor: params.window_anchor,
            analysis: params.clone(),
        }
    }

    /// Extract features for the source's current playhead
    pub fn extract<S: AudioSource + ?Sized>(&self, source: &S, frame: &AnalysisFrame) -> Features {
        let channels = self.channel_windows(source);
        self.extract_with_channels(frame, channels)
    }

    /// Extract from a frame plus optional left/right PCM windows.
    ///
    /// `None` selects the mono fallback: both sides mirror the frame.
    pub fn extract_with_channels(
        &self,
        frame: &AnalysisFrame,
        channels: Option<(&[f32], &[f32])>,
    ) -> Features {
        let overall = overall_intensity(&frame.time_domain);

        let (left, right, stereo) = match channels {
            Some((left, right)) => (window_stats(left), window_stats(right), true),
            None => {
                let mono = ChannelSample {
                    intensity: overall,
                    sharpness: max_delta(&frame.time_domain),
                };
                (mono, mono, false)
            }
        };

        Features {
            overall_intensity: overall,
            left,
            right,
            low_frequency_intensity: low_frequency_intensity(
                &frame.frequency_domain,
                self.analysis.haptic_range(frame.frequency_domain.len()),
            ),
            dominant_band: dominant_band(&frame.frequency_domain),
            stereo,
        }
    }

    /// Left and right windows around the playhead, if the source has them
    fn channel_windows<'a, S: AudioSource + ?Sized>(
        &self,
        source: &'a S,
    ) -> Option<(&'a [f32], &'a [f32])> {
        if source.channel_count() < 2 {
            return None;
        }
        let position = source.current_time_samples();
        let (start, count) = match self.anchor {
            WindowAnchor::Lookahead => (position, self.window),
            WindowAnchor::Lookback => {
                let start = position.saturating_sub(self.window);
                (start, position - start)
            }
        };
        let left = source.channel_pcm(Side::Left.channel(), start, count)?;
        let right = source.channel_pcm(Side::Right.channel(), start, count)?;
        Some((left, right))
    }
}
