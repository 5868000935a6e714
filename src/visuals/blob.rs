//! Organic blob outline.
//!
//! A closed ring of vertices whose radii are recomputed from scratch every
//! tick. Nothing carries over between ticks except the noise time axis, so
//! the outline is a pure function of seed, features, frame and angle.

use std::f32::consts::TAU;

use crate::features::Features;
use crate::noise::NoiseGenerator;
use crate::params::{BlobParams, RenderConfig};
use crate::render::{hsb_to_rgba, map_range, Shape};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobVertex {
    /// Fixed, evenly spaced in [0, 2π)
    pub angle: f32,
    pub radius: f32,
}

pub struct BlobRing {
    params: BlobParams,
    noise: NoiseGenerator,
    vertices: Vec<BlobVertex>,
    overall: f32,
}

impl BlobRing {
    pub fn new(params: BlobParams) -> Self {
        let count = params.vertex_count;
        let vertices = (0..count)
            .map(|i| BlobVertex {
                angle: TAU * i as f32 / count as f32,
                radius: 0.0,
            })
            .collect();
        Self {
            noise: NoiseGenerator::new(params.noise_seed),
            params,
            vertices,
            overall: 0.0,
        }
    }

    pub fn vertices(&self) -> &[BlobVertex] {
        &self.vertices
    }

    pub fn reset(&mut self) {
        for vertex in &mut self.vertices {
            vertex.radius = 0.0;
        }
        self.overall = 0.0;
    }

    pub fn update(&mut self, features: &Features, spectrum: &[f32], frame: u64, min_dim: f32) {
        for i in 0..self.vertices.len() {
            let angle = self.vertices[i].angle;
            self.vertices[i].radius = self.radius_at(angle, features, spectrum, frame, min_dim);
        }
        self.overall = features.overall_intensity;
    }

    /// Outline radius at `angle`
    pub fn radius_at(
        &self,
        angle: f32,
        features: &Features,
        spectrum: &[f32],
        frame: u64,
        min_dim: f32,
    ) -> f32 {
        let p = &self.params;
        let overall = features.overall_intensity.clamp(0.0, 1.0);
        let base = min_dim * (p.base_fraction + p.base_gain * overall);

        let (sin_a, cos_a) = angle.sin_cos();
        let noise = self.noise.octaves_3d(
            cos_a as f64 * p.noise_frequency,
            sin_a as f64 * p.noise_frequency,
            frame as f64 * p.noise_time_scale,
            p.noise_octaves,
        ) * p.noise_amplitude
            * min_dim;

        let spectral = spectral_level(angle, spectrum, p.spectral_span) * p.spectral_gain * min_dim;

        let stereo = features.asymmetry() * p.stereo_gain * min_dim * -cos_a;

        let pulsing = (frame as f32 * p.pulse_rate + angle * p.pulse_lobes).sin()
            * p.pulse_amplitude
            * min_dim;

        let radius = base + noise + spectral + stereo + pulsing;
        let floor = p.min_fraction * min_dim;
        if radius.is_finite() {
            radius.max(floor)
        } else {
            floor
        }
    }

    pub fn shape(&self, config: &RenderConfig) -> Shape {
        let hue = map_range(self.overall.clamp(0.0, 1.0), 0.0, 1.0, 240.0, 0.0);
        Shape::Blob {
            center: config.center().to_array(),
            vertices: self.vertices.iter().map(|v| [v.angle, v.radius]).collect(),
            color: hsb_to_rgba(hue, 70.0, 100.0, 0.7),
        }
    }
}

/// Spectrum level for the bin mapped from `angle`.
///
/// The angle is mirrored around π so both halves of the ring read the same
/// low `span` of the spectrum and the outline closes without a seam.
fn spectral_level(angle: f32, spectrum: &[f32], span: f32) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let t = (angle / TAU).rem_euclid(1.0);
    let u = 1.0 - (2.0 * t - 1.0).abs();
    let last = (spectrum.len() - 1) as f32;
    let bin = (u * span.clamp(0.0, 1.0) * last).round() as usize;
    let level = spectrum[bin.min(spectrum.len() - 1)];
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ChannelSample;

    const MIN_DIM: f32 = 720.0;

    fn features(left: f32, right: f32, stereo: bool) -> Features {
        Features {
            overall_intensity: (left + right) / 2.0,
            left: ChannelSample {
                intensity: left,
                sharpness: 0.0,
            },
            right: ChannelSample {
                intensity: right,
                sharpness: 0.0,
            },
            stereo,
            ..Features::default()
        }
    }

    #[test]
    fn test_vertices_evenly_spaced() {
        let ring = BlobRing::new(BlobParams::default());
        assert_eq!(ring.vertices().len(), 80);
        let step = ring.vertices()[1].angle - ring.vertices()[0].angle;
        assert!((step - TAU / 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let a = BlobRing::new(BlobParams::default());
        let b = BlobRing::new(BlobParams::default());
        let f = features(0.4, 0.2, true);
        let spectrum = vec![0.5; 1024];
        assert_eq!(
            a.radius_at(1.0, &f, &spectrum, 17, MIN_DIM),
            b.radius_at(1.0, &f, &spectrum, 17, MIN_DIM)
        );
    }

    #[test]
    fn test_bounded_change_between_frames() {
        let mut ring = BlobRing::new(BlobParams::default());
        let f = features(0.5, 0.3, true);
        let spectrum: Vec<f32> = (0..1024).map(|i| 1.0 - i as f32 / 1024.0).collect();

        ring.update(&f, &spectrum, 0, MIN_DIM);
        for frame in 1..120 {
            let before: Vec<f32> = ring.vertices().iter().map(|v| v.radius).collect();
            ring.update(&f, &spectrum, frame, MIN_DIM);
            for (prev, v) in before.iter().zip(ring.vertices()) {
                assert!((v.radius - prev).abs() < 0.05 * MIN_DIM);
            }
        }
    }

    #[test]
    fn test_mono_has_no_stereo_term() {
        let ring = BlobRing::new(BlobParams::default());
        let mono = features(0.8, 0.2, false);
        let symmetric = features(0.5, 0.5, true);
        for angle in [0.0, 1.0, 3.0] {
            assert_eq!(
                ring.radius_at(angle, &mono, &[], 3, MIN_DIM),
                ring.radius_at(angle, &symmetric, &[], 3, MIN_DIM)
            );
        }
    }

    #[test]
    fn test_louder_left_bulges_left() {
        let params = BlobParams {
            noise_amplitude: 0.0,
            pulse_amplitude: 0.0,
            ..BlobParams::default()
        };
        let ring = BlobRing::new(params);
        let f = features(0.9, 0.1, true);
        let left = ring.radius_at(std::f32::consts::PI, &f, &[], 0, MIN_DIM);
        let right = ring.radius_at(0.0, &f, &[], 0, MIN_DIM);
        assert!(left > right);
    }

    #[test]
    fn test_radius_floor() {
        let params = BlobParams {
            base_fraction: 0.0,
            base_gain: 0.0,
            stereo_gain: 10.0,
            ..BlobParams::default()
        };
        let ring = BlobRing::new(params);
        let f = features(0.0, 1.0, true);
        let r = ring.radius_at(std::f32::consts::PI, &f, &[], 0, MIN_DIM);
        assert!((r - 0.02 * MIN_DIM).abs() < 1e-3);
    }

    #[test]
    fn test_spectral_mirror_closes_ring() {
        let spectrum: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let a = spectral_level(0.3, &spectrum, 0.25);
        let b = spectral_level(TAU - 0.3, &spectrum, 0.25);
        assert_eq!(a, b);
        assert_eq!(spectral_level(0.0, &spectrum, 0.25), 0.0);
        assert_eq!(spectral_level(1.0, &[], 0.25), 0.0);
    }
}
