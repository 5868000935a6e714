//! Stereo particle swarm.
//!
//! Particles belong to a side and a spectrum band. Each side's population is
//! pulled toward its own target column with a spring that stiffens as that
//! channel gets louder, and pushed outward when the other channel dominates.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::audio::Side;
use crate::features::Features;
use crate::params::{RenderConfig, SwarmParams};
use crate::render::{hsb_to_rgba, map_range, ParticleInstance};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Spectrum bin driving this particle's colour
    pub band: usize,
    pub side: Side,
}

#[derive(Debug, Clone)]
pub struct Swarm {
    params: SwarmParams,
    particles: Vec<Particle>,
}

impl Swarm {
    pub fn new(params: SwarmParams) -> Self {
        Self {
            params,
            particles: Vec::new(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn reset(&mut self) {
        self.particles.clear();
    }

    /// One active tick: resize the population, then integrate every particle
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        features: &Features,
        bins: usize,
        config: &RenderConfig,
        rng: &mut R,
    ) {
        let target = self.params.target_count(features.overall_intensity);
        if self.particles.len() > target {
            self.particles.truncate(target);
        }
        while self.particles.len() < target {
            let particle = self.spawn(features, bins, config, rng);
            self.particles.push(particle);
        }

        let params = &self.params;
        for particle in &mut self.particles {
            step(particle, params, features, config, rng);
        }
    }

    fn spawn<R: Rng + ?Sized>(
        &self,
        features: &Features,
        bins: usize,
        config: &RenderConfig,
        rng: &mut R,
    ) -> Particle {
        let left = features.left.intensity.max(0.0);
        let right = features.right.intensity.max(0.0);
        let total = left + right;
        let p_left = if total > 0.0 && total.is_finite() {
            (left / total).clamp(0.0, 1.0) as f64
        } else {
            0.5
        };
        let side = if rng.gen_bool(p_left) {
            Side::Left
        } else {
            Side::Right
        };

        let half = config.canvas_width / 2.0;
        let x = match side {
            Side::Left => rng.gen_range(0.0..half),
            Side::Right => rng.gen_range(half..config.canvas_width),
        };
        let y = rng.gen_range(0.0..config.canvas_height);

        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: rng.gen_range(self.params.size_min..=self.params.size_max),
            band: rng.gen_range(0..bins.max(1)),
            side,
        }
    }

    pub fn instances(&self, spectrum: &[f32]) -> Vec<ParticleInstance> {
        let bins = spectrum.len().max(1) as f32;
        self.particles
            .iter()
            .map(|p| {
                let level = spectrum.get(p.band).copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let hue = map_range(p.band as f32, 0.0, bins, 240.0, 0.0);
                let brightness = map_range(level, 0.0, 1.0, 30.0, 100.0);
                ParticleInstance {
                    position: p.position.to_array(),
                    size: p.size,
                    color: hsb_to_rgba(hue, 80.0, brightness, 0.8),
                }
            })
            .collect()
    }
}

fn step<R: Rng + ?Sized>(
    particle: &mut Particle,
    params: &SwarmParams,
    features: &Features,
    config: &RenderConfig,
    rng: &mut R,
) {
    let own = features.channel(particle.side);
    let opposite = features.channel(particle.side.opposite()).intensity;

    let target_fraction = match particle.side {
        Side::Left => params.left_target,
        Side::Right => params.right_target,
    };
    let dx = config.canvas_width * target_fraction - particle.position.x;
    particle.velocity.x += dx * (params.spring_base + params.spring_gain * own.intensity);

    // Push outward when the other channel dominates
    if opposite > own.intensity {
        particle.velocity.x += particle.side.sign() * params.repulsion * (opposite - own.intensity);
    }

    let cy = config.canvas_height / 2.0;
    particle.velocity.y += (cy - particle.position.y) * params.center_pull;

    if particle.velocity.length() < params.stall_velocity && dx.abs() < params.stall_distance {
        particle.velocity += Vec2::new(
            rng.gen_range(-params.stall_impulse..=params.stall_impulse),
            rng.gen_range(-params.stall_impulse..=params.stall_impulse),
        );
    }

    if own.sharpness > params.burst_sharpness {
        let angle = rng.gen_range(0.0..TAU);
        particle.velocity += Vec2::from_angle(angle) * params.burst_impulse;
    }

    particle.velocity *= params.damping;
    particle.position += particle.velocity;

    if particle.position.x < 0.0 || particle.position.x > config.canvas_width {
        particle.velocity.x = -particle.velocity.x * params.restitution;
        particle.position.x = particle.position.x.clamp(0.0, config.canvas_width);
    }
    if particle.position.y < 0.0 || particle.position.y > config.canvas_height {
        particle.velocity.y = -particle.velocity.y * params.restitution;
        particle.position.y = particle.position.y.clamp(0.0, config.canvas_height);
    }
}
