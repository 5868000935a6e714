//! Particle swarm physics parameters.

use serde::{Deserialize, Serialize};

/// Particle swarm population and motion tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmParams {
    /// Particles alive at zero intensity
    pub base_count: usize,

    /// Additional particles per unit overall intensity
    /// Formula: target = base_count + floor(count_gain * intensity)
    pub count_gain: f32,

    /// Spring constant toward the side target at zero intensity
    pub spring_base: f32,

    /// Spring constant added per unit of own-side intensity
    pub spring_gain: f32,

    /// Push away from the opposite half per unit of intensity difference
    pub repulsion: f32,

    /// Pull toward the vertical centre (per pixel of offset)
    pub center_pull: f32,

    /// Speed under which a particle counts as stalled (pixels/frame)
    pub stall_velocity: f32,

    /// Distance to target under which a slow particle counts as stalled
    pub stall_distance: f32,

    /// Magnitude of the random anti-stall nudge
    pub stall_impulse: f32,

    /// Own-side sharpness above which particles burst
    pub burst_sharpness: f32,

    /// Magnitude of the random burst impulse
    pub burst_impulse: f32,

    /// Multiplicative velocity damping per frame
    pub damping: f32,

    /// Fraction of speed kept (reversed) when bouncing off an edge
    pub restitution: f32,

    /// Smallest particle size (pixels)
    pub size_min: f32,

    /// Largest particle size (pixels)
    pub size_max: f32,

    /// Target x of left-side particles as a fraction of canvas width
    pub left_target: f32,

    /// Target x of right-side particles as a fraction of canvas width
    pub right_target: f32,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            base_count: 100,
            count_gain: 400.0,
            spring_base: 0.002,
            spring_gain: 0.02,
            repulsion: 0.4,
            center_pull: 0.001,
            stall_velocity: 0.1,
            stall_distance: 20.0,
            stall_impulse: 1.5,
            burst_sharpness: 0.3,
            burst_impulse: 3.0,
            damping: 0.96,
            restitution: 0.5,
            size_min: 2.0,
            size_max: 5.0,
            left_target: 0.25,
            right_target: 0.75,
        }
    }
}

impl SwarmParams {
    /// Population the swarm converges to for a given overall intensity
    pub fn target_count(&self, intensity: f32) -> usize {
        let i = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.base_count + (self.count_gain * i).floor() as usize
    }
}
