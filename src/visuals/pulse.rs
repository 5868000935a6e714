//! Expanding stereo pulses.
//!
//! Each side of the canvas emits rings whose speed, reach and opacity follow
//! that channel's intensity. A fallback keeps something on screen for quiet
//! material so a playing track never looks frozen.

use crate::audio::Side;
use crate::features::Features;
use crate::params::{PulseParams, RenderConfig};
use crate::render::{hsb_to_rgba, map_range, PulseInstance};

/// One ring
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub id: u64,
    pub side: Side,
    /// Channel intensity at spawn time
    pub intensity: f32,
    pub sharpness: f32,
    pub radius: f32,
    pub created_at_frame: u64,
    pub max_radius: f32,
}

impl Pulse {
    /// Opacity in 0..255, fading with growth but never below `min_fade`
    pub fn opacity(&self, params: &PulseParams) -> f32 {
        let fade = (1.0 - self.radius / self.max_radius).max(params.min_fade);
        255.0 * (0.3 + 0.7 * self.intensity) * fade
    }

    fn is_spent(&self, params: &PulseParams) -> bool {
        self.radius > self.max_radius || self.opacity(params) < params.visibility_floor
    }
}

/// Live pulses for both sides plus spawn bookkeeping
#[derive(Debug, Clone)]
pub struct PulseField {
    params: PulseParams,
    pulses: Vec<Pulse>,
    next_id: u64,
    /// Frame of the most recent spawn per side
    last_spawn: [u64; 2],
    /// Frame of the most recent spawn on either side
    last_any_spawn: u64,
}

impl PulseField {
    pub fn new(params: PulseParams) -> Self {
        Self {
            params,
            pulses: Vec::new(),
            next_id: 0,
            last_spawn: [0; 2],
            last_any_spawn: 0,
        }
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn params(&self) -> &PulseParams {
        &self.params
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.params.clone());
    }

    /// Alive pulses on `side` spawned within the concurrency window
    pub fn recent_count(&self, side: Side, frame: u64) -> usize {
        self.pulses
            .iter()
            .filter(|p| {
                p.side == side
                    && frame.saturating_sub(p.created_at_frame) < self.params.concurrency_window
            })
            .count()
    }

    /// One active tick: advance, retire, spawn, fallback
    pub fn update(&mut self, features: &Features, frame: u64, min_dim: f32) {
        // Advance
        for pulse in &mut self.pulses {
            pulse.radius += self.params.base_speed + pulse.intensity * self.params.speed_gain;
        }

        // Retire
        let params = &self.params;
        self.pulses.retain(|p| !p.is_spent(params));

        // Spawn
        for side in Side::BOTH {
            let sample = features.channel(side);
            if self.recent_count(side, frame) >= self.params.max_concurrent {
                continue;
            }
            let idle = frame.saturating_sub(self.last_spawn[side.channel()])
                >= self.params.idle_spawn_frames;
            if sample.intensity > self.params.spawn_threshold || (sample.intensity > 0.0 && idle) {
                self.spawn(side, sample.intensity, sample.sharpness, frame, min_dim);
            }
        }

        // Fallback
        let louder = features.louder_side();
        let louder_level = features.channel(louder).intensity;
        let fallback_level = louder_level.max(self.params.fallback_min_intensity);
        let sharpness = features.channel(louder).sharpness;
        if self.pulses.is_empty() && louder_level > 0.0 {
            self.spawn(louder, fallback_level, sharpness, frame, min_dim);
        } else if frame.saturating_sub(self.last_any_spawn) >= self.params.idle_spawn_frames {
            self.spawn(louder, fallback_level, sharpness, frame, min_dim);
        }
    }

    fn spawn(&mut self, side: Side, intensity: f32, sharpness: f32, frame: u64, min_dim: f32) {
        let intensity = if intensity.is_finite() {
            intensity.max(0.0)
        } else {
            0.0
        };
        let max_radius =
            min_dim * (self.params.max_radius_base + intensity * self.params.max_radius_gain);

        self.pulses.push(Pulse {
            id: self.next_id,
            side,
            intensity,
            sharpness,
            radius: self.params.start_radius,
            created_at_frame: frame,
            max_radius,
        });
        self.next_id += 1;
        self.last_spawn[side.channel()] = frame;
        self.last_any_spawn = frame;
    }

    /// Instance records, origins offset from the centre by side
    pub fn instances(&self, config: &RenderConfig) -> Vec<PulseInstance> {
        let center = config.center();
        self.pulses
            .iter()
            .map(|p| {
                let x = center.x + p.side.sign() * self.params.side_offset * config.canvas_width;
                let hue = match p.side {
                    Side::Left => 200.0,
                    Side::Right => 330.0,
                };
                let brightness = map_range(p.intensity.min(1.0), 0.0, 1.0, 60.0, 100.0);
                PulseInstance {
                    center: [x, center.y],
                    radius: p.radius,
                    stroke_weight: 1.0 + 3.0 * p.sharpness.clamp(0.0, 1.0),
                    color: hsb_to_rgba(hue, 80.0, brightness, p.opacity(&self.params) / 255.0),
                    side: p.side.channel() as u32,
                }
            })
            .collect()
    }
}
