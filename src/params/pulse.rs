//! Pulse field lifecycle parameters.

use serde::{Deserialize, Serialize};

/// Pulse spawn / growth / retirement tuning
///
/// Thresholds were tuned by eye against real material; they are kept as
/// named values rather than derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Channel intensity above which a side spawns a pulse every tick
    pub spawn_threshold: f32,

    /// Frames without a spawn after which any nonzero intensity spawns
    pub idle_spawn_frames: u64,

    /// Alive pulses allowed per side inside the concurrency window
    pub max_concurrent: usize,

    /// Age (frames) under which a pulse counts against the cap
    pub concurrency_window: u64,

    /// Radius growth per frame at zero intensity (pixels)
    pub base_speed: f32,

    /// Extra growth per frame per unit intensity (pixels)
    /// Formula: speed = base_speed + intensity * speed_gain
    pub speed_gain: f32,

    /// Radius of a freshly spawned pulse (pixels)
    pub start_radius: f32,

    /// Max radius as a fraction of the shorter canvas side at zero intensity
    pub max_radius_base: f32,

    /// Additional max radius fraction per unit intensity
    pub max_radius_gain: f32,

    /// Lowest fade factor applied to opacity near full expansion
    pub min_fade: f32,

    /// Opacity (0-255) below which a pulse is retired
    pub visibility_floor: f32,

    /// Intensity given to fallback / keep-alive pulses when the track is quiet
    /// 0.15 * 0.3
    pub fallback_min_intensity: f32,

    /// Horizontal distance of each side's pulse origin from the centre,
    /// as a fraction of canvas width
    pub side_offset: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            spawn_threshold: 0.03,
            idle_spawn_frames: 60,
            max_concurrent: 5,
            concurrency_window: 40,
            base_speed: 6.0,
            speed_gain: 12.0,
            start_radius: 4.0,
            max_radius_base: 0.35,
            max_radius_gain: 0.4,
            min_fade: 0.1,
            visibility_floor: 15.0,
            fallback_min_intensity: 0.045,
            side_offset: 0.25,
        }
    }
}
