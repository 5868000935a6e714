//! Noise generation for the blob outline.
//!
//! OpenSimplex is smooth and artifact-free, so neighbouring vertices and
//! consecutive frames stay close to each other.

use noise::{NoiseFn, OpenSimplex};

/// Seeded OpenSimplex sampler
pub struct NoiseGenerator {
    simplex: OpenSimplex,
}

impl NoiseGenerator {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Sample 3D simplex noise at position
    ///
    /// Returns value in range [-1, 1]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f32 {
        let v = self.simplex.get([x, y, z]) as f32;
        if v.is_finite() {
            v.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Fractal sum of `octaves` layers, each at double frequency and half
    /// amplitude, normalized back to [-1, 1]
    pub fn octaves_3d(&self, x: f64, y: f64, z: f64, octaves: u32) -> f32 {
        let mut sum = 0.0;
        let mut norm = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for _ in 0..octaves.max(1) {
            sum += self.sample_3d(x * frequency, y * frequency, z * frequency) * amplitude;
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        (sum / norm).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = NoiseGenerator::new(42);
        let b = NoiseGenerator::new(42);
        assert_eq!(a.octaves_3d(0.3, 0.7, 1.1, 3), b.octaves_3d(0.3, 0.7, 1.1, 3));
    }

    #[test]
    fn test_octaves_stay_in_range() {
        let gen = NoiseGenerator::new(7);
        for i in 0..200 {
            let t = i as f64 * 0.37;
            let v = gen.octaves_3d(t.cos(), t.sin(), t * 0.1, 3);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_smooth_in_time() {
        let gen = NoiseGenerator::new(1);
        let a = gen.octaves_3d(0.5, 0.5, 0.00, 3);
        let b = gen.octaves_3d(0.5, 0.5, 0.01, 3);
        assert!((a - b).abs() < 0.1);
    }
}
