//! Blob ring shape parameters.

use serde::{Deserialize, Serialize};

/// Blob ring tuning (all lengths are fractions of the shorter canvas side)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    /// Vertices in the closed ring
    pub vertex_count: usize,

    /// Base radius at zero intensity
    pub base_fraction: f32,

    /// Base radius added per unit overall intensity
    pub base_gain: f32,

    /// Amplitude of the octave noise term
    pub noise_amplitude: f32,

    /// Spatial frequency of the first noise octave (around the ring)
    pub noise_frequency: f64,

    /// Noise octaves (each doubles frequency, halves amplitude)
    pub noise_octaves: u32,

    /// Noise time step per frame
    pub noise_time_scale: f64,

    /// Amplitude of the spectral term
    pub spectral_gain: f32,

    /// Fraction of the spectrum spread around the ring (low bins carry energy)
    pub spectral_span: f32,

    /// Amplitude of the stereo asymmetry term per unit left/right difference
    pub stereo_gain: f32,

    /// Amplitude of the oscillatory pulsing term
    pub pulse_amplitude: f32,

    /// Pulsing phase advance per frame (radians)
    pub pulse_rate: f32,

    /// Number of pulsing lobes around the ring
    pub pulse_lobes: f32,

    /// Smallest allowed vertex radius
    pub min_fraction: f32,

    /// Noise seed
    pub noise_seed: u32,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            vertex_count: 80,
            base_fraction: 0.15,
            base_gain: 0.2,
            noise_amplitude: 0.05,
            noise_frequency: 0.8,
            noise_octaves: 3,
            noise_time_scale: 0.01,
            spectral_gain: 0.12,
            spectral_span: 0.25,
            stereo_gain: 0.15,
            pulse_amplitude: 0.02,
            pulse_rate: 0.08,
            pulse_lobes: 5.0,
            min_fraction: 0.02,
            noise_seed: 42,
        }
    }
}
