//! Audio sources: decoded PCM, analysis frames and transport control.
//!
//! The tick loop only talks to the [`AudioSource`] and [`Transport`] traits.
//! [`OfflineSource`] advances on the tick clock (headless runs, tests);
//! `LivePlayback` (feature `playback`) follows a cpal output stream.

mod buffer;
mod fft;
mod loader;
mod offline;
mod playhead;
#[cfg(feature = "playback")]
mod system;

use serde::{Deserialize, Serialize};

// Re-export public types
pub use buffer::PcmBuffer;
pub use fft::{hann_window, Analyzer};
pub use loader::{spawn_decode, PendingTrack};
pub use offline::OfflineSource;
pub use playhead::{Playhead, RateStep};
#[cfg(feature = "playback")]
pub use system::LivePlayback;

/// Stereo side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// PCM channel index carrying this side
    pub fn channel(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// One tick's analyser snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFrame {
    /// Mixed time-domain samples in [-1, 1]
    pub time_domain: Vec<f32>,
    /// Normalized magnitude per frequency bin in [0, 1]
    pub frequency_domain: Vec<f32>,
}

impl AnalysisFrame {
    pub fn new(time_domain: Vec<f32>, frequency_domain: Vec<f32>) -> Self {
        Self {
            time_domain,
            frequency_domain,
        }
    }

    /// Build a frame from byte-encoded analyser output
    ///
    /// Time-domain bytes are centred on 128, frequency bytes span 0-255.
    pub fn from_bytes(time_domain: &[u8], frequency_domain: &[u8]) -> Self {
        Self {
            time_domain: time_domain
                .iter()
                .map(|&b| ((b as f32 - 128.0) / 128.0).clamp(-1.0, 1.0))
                .collect(),
            frequency_domain: frequency_domain.iter().map(|&b| b as f32 / 255.0).collect(),
        }
    }
}

/// Read side of a playing track, polled once per tick
pub trait AudioSource {
    /// Playhead position in samples (per channel)
    fn current_time_samples(&self) -> usize;

    fn sample_rate(&self) -> u32;

    fn channel_count(&self) -> usize;

    /// Raw PCM for `channel` in `[start, start + count)`, truncated to the
    /// buffer. `None` when the channel is missing or the buffer is not ready.
    fn channel_pcm(&self, channel: usize, start: usize, count: usize) -> Option<&[f32]>;

    /// Normalized magnitude per bin in [0, 1]
    fn analyze_frequency_domain(&mut self) -> Vec<f32>;

    /// Most recent mixed samples in [-1, 1]
    fn analyze_time_domain(&mut self) -> Vec<f32>;

    fn is_playing(&self) -> bool;

    fn duration_seconds(&self) -> f32;

    /// Move the playhead forward by one tick's worth of samples.
    /// Sources clocked by an output device ignore this.
    fn advance_clock(&mut self, _samples: usize) {}

    /// Snapshot both analyser views
    fn analysis_frame(&mut self) -> AnalysisFrame {
        let time_domain = self.analyze_time_domain();
        let frequency_domain = self.analyze_frequency_domain();
        AnalysisFrame::new(time_domain, frequency_domain)
    }

    /// Playhead position as a fraction of the track, if the length is known
    fn playhead_fraction(&self) -> Option<f32> {
        let total = self.duration_seconds() * self.sample_rate() as f32;
        if total > 0.0 {
            Some((self.current_time_samples() as f32 / total).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

/// Write side: playback control
pub trait Transport {
    /// Start or resume from the current position
    fn play(&mut self);

    /// Stop, keeping the position
    fn pause(&mut self);

    /// Stop and rewind
    fn stop(&mut self);

    fn set_loop(&mut self, looping: bool);

    /// Jump to `seconds` (clamped to the track)
    fn seek(&mut self, seconds: f32);

    /// Volume in percent (0-100)
    fn set_volume(&mut self, percent: f32);
}
