//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (pixels, frames, samples, Hz)
//! - Documented ranges and meanings
//! - Serde support so a JSON file can override any subset

mod audio;
mod blob;
mod pulse;
mod render;
mod swarm;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VisualizerError};

// Re-export all types
pub use audio::{AnalysisParams, WindowAnchor};
pub use blob::BlobParams;
pub use pulse::PulseParams;
pub use render::RenderConfig;
pub use swarm::SwarmParams;

/// Every tunable of the visualizer in one place
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerParams {
    pub analysis: AnalysisParams,
    pub pulse: PulseParams,
    pub swarm: SwarmParams,
    pub blob: BlobParams,
    pub render: RenderConfig,
}

impl VisualizerParams {
    /// Load parameters from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject configurations the tick loop cannot run with
    pub fn validate(&self) -> Result<()> {
        self.analysis
            .validate()
            .map_err(VisualizerError::InvalidParams)?;

        if self.render.tick_rate_hz == 0 {
            return Err(VisualizerError::InvalidParams(
                "Tick rate must be > 0".to_string(),
            ));
        }
        let canvas_ok = |v: f32| v.is_finite() && v > 0.0;
        if !canvas_ok(self.render.canvas_width) || !canvas_ok(self.render.canvas_height) {
            return Err(VisualizerError::InvalidParams(format!(
                "Canvas must be non-empty, got {}x{}",
                self.render.canvas_width, self.render.canvas_height
            )));
        }
        if !(self.swarm.damping > 0.0 && self.swarm.damping <= 1.0) {
            return Err(VisualizerError::InvalidParams(format!(
                "Swarm damping must be in (0, 1], got {}",
                self.swarm.damping
            )));
        }
        if !(self.swarm.size_min.is_finite()
            && self.swarm.size_max.is_finite()
            && self.swarm.size_min <= self.swarm.size_max)
        {
            return Err(VisualizerError::InvalidParams(
                "Swarm size_min must not exceed size_max".to_string(),
            ));
        }
        // Both impulses bound symmetric random ranges
        for (name, impulse) in [
            ("stall_impulse", self.swarm.stall_impulse),
            ("burst_impulse", self.swarm.burst_impulse),
        ] {
            if !(impulse.is_finite() && impulse >= 0.0) {
                return Err(VisualizerError::InvalidParams(format!(
                    "Swarm {name} must be >= 0, got {impulse}"
                )));
            }
        }
        if self.blob.vertex_count < 3 {
            return Err(VisualizerError::InvalidParams(format!(
                "Blob ring needs at least 3 vertices, got {}",
                self.blob.vertex_count
            )));
        }
        if !(self.pulse.base_speed.is_finite() && self.pulse.base_speed > 0.0) {
            return Err(VisualizerError::InvalidParams(
                "Pulse base_speed must be > 0 so radii keep growing".to_string(),
            ));
        }
        if !(self.pulse.speed_gain.is_finite() && self.pulse.speed_gain >= 0.0) {
            return Err(VisualizerError::InvalidParams(format!(
                "Pulse speed_gain must be >= 0, got {}",
                self.pulse.speed_gain
            )));
        }
        Ok(())
    }
}
