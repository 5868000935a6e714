//! FFT analyser producing normalized spectrum and waveform frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalysisParams;

/// Windowed FFT analyser with inter-frame smoothing and dB normalization
pub struct Analyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes (fft_size / 2)
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl Analyzer {
    pub fn new(params: &AnalysisParams) -> Self {
        let fft_size = params.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window: (0..fft_size).map(|i| hann_window(i, fft_size)).collect(),
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            smoothing: params.smoothing,
            min_db: params.min_decibels,
            max_db: params.max_decibels,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Forget smoothing history (track switch, seek)
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Latest `fft_size` samples, zero-padded at the front when short
    pub fn time_domain(&self, recent: &[f32]) -> Vec<f32> {
        let mut frame = vec![0.0; self.fft_size];
        let take = recent.len().min(self.fft_size);
        let src = &recent[recent.len() - take..];
        frame[self.fft_size - take..].copy_from_slice(src);
        for s in &mut frame {
            let v = *s;
            *s = if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        }
        frame
    }

    /// Normalized magnitude spectrum of the latest `fft_size` samples
    pub fn frequency_domain(&mut self, recent: &[f32]) -> Vec<f32> {
        let samples = self.time_domain(recent);

        // Apply Hann window
        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            *slot = Complex::new(samples[i] * self.window[i], 0.0);
        }

        // Perform FFT
        self.fft.process(&mut self.fft_buffer);

        let scale = 1.0 / self.fft_size as f32;
        let range = self.max_db - self.min_db;
        let mut out = Vec::with_capacity(self.smoothed.len());

        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() * scale;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;

            let db = 20.0 * smoothed.log10();
            let value = (db - self.min_db) / range;
            out.push(if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            });
        }
        out
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
