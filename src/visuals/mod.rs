//! Visualization parameter mapper.
//!
//! Maps one tick of [`Features`] (plus the analyser frame and the frame
//! counter) to the next state of the active mode. Modes never draw; they
//! produce [`Shape`] data for the render surface.

mod blob;
mod pulse;
mod swarm;
mod trace;

use clap::ValueEnum;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::audio::AnalysisFrame;
use crate::features::Features;
use crate::params::{RenderConfig, VisualizerParams};
use crate::render::Shape;

pub use blob::{BlobRing, BlobVertex};
pub use pulse::{Pulse, PulseField};
pub use swarm::{Particle, Swarm};
pub use trace::{spectrum_shape, waveform_shape, HapticTrace, History, SpectrogramTrace};

/// Selectable visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    Waveform,
    Spectrum,
    Haptic,
    Spectrogram,
    #[default]
    Pulses,
    Swarm,
    Blob,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 7] = [
        VisualizationMode::Waveform,
        VisualizationMode::Spectrum,
        VisualizationMode::Haptic,
        VisualizationMode::Spectrogram,
        VisualizationMode::Pulses,
        VisualizationMode::Swarm,
        VisualizationMode::Blob,
    ];
}

/// Inputs for one active tick
pub struct TickContext<'a> {
    pub features: &'a Features,
    pub frame: &'a AnalysisFrame,
    /// Active ticks since the last reset
    pub frame_index: u64,
    pub render: &'a RenderConfig,
    pub rng: &'a mut StdRng,
}

/// Persistent state of the active mode
pub enum ModeState {
    Waveform,
    Spectrum,
    Haptic(HapticTrace),
    Spectrogram(SpectrogramTrace),
    Pulses(PulseField),
    Swarm(Swarm),
    Blob(BlobRing),
}

impl ModeState {
    pub fn new(mode: VisualizationMode, params: &VisualizerParams) -> Self {
        let history = params.render.history_len;
        match mode {
            VisualizationMode::Waveform => ModeState::Waveform,
            VisualizationMode::Spectrum => ModeState::Spectrum,
            VisualizationMode::Haptic => ModeState::Haptic(HapticTrace::new(history)),
            VisualizationMode::Spectrogram => {
                ModeState::Spectrogram(SpectrogramTrace::new(history))
            }
            VisualizationMode::Pulses => ModeState::Pulses(PulseField::new(params.pulse.clone())),
            VisualizationMode::Swarm => ModeState::Swarm(Swarm::new(params.swarm.clone())),
            VisualizationMode::Blob => ModeState::Blob(BlobRing::new(params.blob.clone())),
        }
    }

    pub fn mode(&self) -> VisualizationMode {
        match self {
            ModeState::Waveform => VisualizationMode::Waveform,
            ModeState::Spectrum => VisualizationMode::Spectrum,
            ModeState::Haptic(_) => VisualizationMode::Haptic,
            ModeState::Spectrogram(_) => VisualizationMode::Spectrogram,
            ModeState::Pulses(_) => VisualizationMode::Pulses,
            ModeState::Swarm(_) => VisualizationMode::Swarm,
            ModeState::Blob(_) => VisualizationMode::Blob,
        }
    }

    /// Advance the mode by one active tick
    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        let min_dim = ctx.render.min_dim();
        match self {
            ModeState::Waveform | ModeState::Spectrum => {}
            ModeState::Haptic(trace) => trace.update(ctx.features.low_frequency_intensity),
            ModeState::Spectrogram(trace) => trace.update(&ctx.frame.frequency_domain),
            ModeState::Pulses(field) => field.update(ctx.features, ctx.frame_index, min_dim),
            ModeState::Swarm(swarm) => swarm.update(
                ctx.features,
                ctx.frame.frequency_domain.len(),
                ctx.render,
                &mut *ctx.rng,
            ),
            ModeState::Blob(ring) => ring.update(
                ctx.features,
                &ctx.frame.frequency_domain,
                ctx.frame_index,
                min_dim,
            ),
        }
    }

    /// Drop all persistent entities
    pub fn reset(&mut self) {
        match self {
            ModeState::Waveform | ModeState::Spectrum => {}
            ModeState::Haptic(trace) => trace.reset(),
            ModeState::Spectrogram(trace) => trace.reset(),
            ModeState::Pulses(field) => field.reset(),
            ModeState::Swarm(swarm) => swarm.reset(),
            ModeState::Blob(ring) => ring.reset(),
        }
    }

    /// Geometry for the current state
    pub fn shape(&self, frame: &AnalysisFrame, config: &RenderConfig) -> Shape {
        match self {
            ModeState::Waveform => waveform_shape(frame, config),
            ModeState::Spectrum => spectrum_shape(frame, config),
            ModeState::Haptic(trace) => trace.shape(config),
            ModeState::Spectrogram(trace) => trace.shape(),
            ModeState::Pulses(field) => Shape::Pulses {
                pulses: field.instances(config),
            },
            ModeState::Swarm(swarm) => Shape::Swarm {
                particles: swarm.instances(&frame.frequency_domain),
            },
            ModeState::Blob(ring) => ring.shape(config),
        }
    }
}
