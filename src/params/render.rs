//! Canvas and tick loop configuration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canvas and tick loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width (pixels)
    pub canvas_width: f32,

    /// Canvas height (pixels)
    pub canvas_height: f32,

    /// Tick rate (Hz), nominally the display refresh
    pub tick_rate_hz: u32,

    /// Frames kept by the haptic and spectrogram histories
    pub history_len: usize,

    /// Seed for stochastic particle behaviour
    pub rng_seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1280.0,
            canvas_height: 720.0,
            tick_rate_hz: 60,
            history_len: 200,
            rng_seed: 7,
        }
    }
}

impl RenderConfig {
    /// Shorter canvas side (pixels)
    pub fn min_dim(&self) -> f32 {
        self.canvas_width.min(self.canvas_height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    /// Total number of ticks covering `duration_secs`
    pub fn ticks_for(&self, duration_secs: f32) -> u64 {
        (duration_secs * self.tick_rate_hz as f32).ceil().max(0.0) as u64
    }

    /// Samples of playback consumed by one tick
    pub fn samples_per_tick(&self, sample_rate_hz: u32) -> usize {
        (sample_rate_hz / self.tick_rate_hz.max(1)) as usize
    }
}
