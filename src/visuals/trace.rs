//! Analyser trace modes: waveform, spectrum, haptic and spectrogram.

use std::collections::VecDeque;
use std::path::Path;

use crate::audio::AnalysisFrame;
use crate::error::Result;
use crate::params::RenderConfig;
use crate::render::{hsb_to_rgba, map_range, write_spectrogram_png, Bar, Shape};

/// Bins drawn saturated in the spectrum, matching the haptic band
const HAPTIC_BAR_BINS: usize = 12;

/// Bounded history; the oldest entry drops first.
///
/// Storage grows with use, so a whole-run capacity costs nothing up front.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Polyline of the time-domain frame
pub fn waveform_shape(frame: &AnalysisFrame, config: &RenderConfig) -> Shape {
    let len = frame.time_domain.len().max(1) as f32;
    let points = frame
        .time_domain
        .iter()
        .enumerate()
        .map(|(i, v)| {
            [
                map_range(i as f32, 0.0, len, 0.0, config.canvas_width),
                map_range(v.clamp(-1.0, 1.0), -1.0, 1.0, config.canvas_height, 0.0),
            ]
        })
        .collect();
    Shape::Waveform {
        points,
        center_y: config.canvas_height / 2.0,
        color: hsb_to_rgba(200.0, 80.0, 100.0, 1.0),
    }
}

/// One bar per bin, hue sweeping blue to red
pub fn spectrum_shape(frame: &AnalysisFrame, config: &RenderConfig) -> Shape {
    let bins = frame.frequency_domain.len();
    let n = bins.max(1) as f32;
    let width = config.canvas_width / n;
    let bars = frame
        .frequency_domain
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let level = v.clamp(0.0, 1.0);
            let height = level * config.canvas_height;
            let hue = map_range(i as f32, 0.0, n, 240.0, 0.0);
            let brightness = map_range(level, 0.0, 1.0, 30.0, 100.0);
            let saturation = if i < HAPTIC_BAR_BINS { 100.0 } else { 50.0 };
            Bar {
                x: i as f32 * width,
                y: config.canvas_height - height,
                width,
                height,
                color: hsb_to_rgba(hue, saturation, brightness, 1.0),
            }
        })
        .collect();
    Shape::Spectrum {
        bars,
        haptic_cutoff_x: (HAPTIC_BAR_BINS as f32 / n).min(1.0) * config.canvas_width,
    }
}

/// Haptic intensity circle with a rolling history
#[derive(Debug, Clone)]
pub struct HapticTrace {
    history: History<f32>,
    current: f32,
}

impl HapticTrace {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
            current: 0.0,
        }
    }

    pub fn update(&mut self, low_frequency_intensity: f32) {
        self.current = low_frequency_intensity.clamp(0.0, 1.0);
        self.history.push(self.current);
    }

    pub fn history(&self) -> &History<f32> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.current = 0.0;
    }

    pub fn shape(&self, config: &RenderConfig) -> Shape {
        let diameter = map_range(self.current, 0.0, 1.0, 50.0, config.min_dim() * 0.8);
        let hue = map_range(self.current, 0.0, 1.0, 240.0, 0.0);

        let last = self.history.len().saturating_sub(1).max(1) as f32;
        let history = self
            .history
            .iter()
            .enumerate()
            .map(|(i, v)| {
                [
                    map_range(i as f32, 0.0, last, 0.0, config.canvas_width),
                    map_range(*v, 0.0, 1.0, config.canvas_height, 0.0),
                ]
            })
            .collect();

        Shape::Haptic {
            center: config.center().to_array(),
            diameter,
            color: hsb_to_rgba(hue, 100.0, 100.0, 0.5),
            label: format!("{:.1}%", self.current * 100.0),
            history,
        }
    }
}

/// Rolling spectrogram
#[derive(Debug, Clone)]
pub struct SpectrogramTrace {
    history: History<Vec<f32>>,
}

impl SpectrogramTrace {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
        }
    }

    pub fn update(&mut self, spectrum: &[f32]) {
        self.history.push(spectrum.to_vec());
    }

    pub fn history(&self) -> &History<Vec<f32>> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn shape(&self) -> Shape {
        Shape::Spectrogram {
            column: self.history.iter().last().cloned().unwrap_or_default(),
            columns: self.history.len(),
        }
    }

    /// Save the current history as a grayscale PNG
    pub fn export_png(&self, path: &Path) -> Result<()> {
        write_spectrogram_png(self.history.iter().map(|c| c.as_slice()), path)
    }
}
