//! Render-ready output emitted once per tick.
//!
//! Nothing here draws. A [`RenderFrame`] is plain data for an external
//! surface: instance records that upload straight into a GPU buffer, shape
//! lists for the trace modes, and the overlay. It serializes to JSON for
//! headless dumps.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::features::Features;
use crate::params::RenderConfig;
use crate::visuals::VisualizationMode;

/// Text shown while nothing is playing
pub const IDLE_PLACEHOLDER: &str = "Select a file to play";

/// One expanding ring, center-anchored on its side of the canvas
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct PulseInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub stroke_weight: f32,
    pub color: [f32; 4],
    /// 0 = left, 1 = right
    pub side: u32,
}

/// One swarm particle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub color: [f32; 4],
}

/// Spectrum bar in canvas coordinates (origin top-left)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
}

/// Mode-specific geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Waveform {
        points: Vec<[f32; 2]>,
        center_y: f32,
        color: [f32; 4],
    },
    Spectrum {
        bars: Vec<Bar>,
        /// x of the haptic band cutoff marker
        haptic_cutoff_x: f32,
    },
    Haptic {
        center: [f32; 2],
        diameter: f32,
        color: [f32; 4],
        /// Percentage label, one decimal
        label: String,
        /// Intensity history as a polyline across the canvas
        history: Vec<[f32; 2]>,
    },
    Spectrogram {
        /// Newest column; the surface scrolls it in
        column: Vec<f32>,
        /// Columns currently held in the history
        columns: usize,
    },
    Pulses {
        pulses: Vec<PulseInstance>,
    },
    Swarm {
        particles: Vec<ParticleInstance>,
    },
    Blob {
        center: [f32; 2],
        /// Ordered (angle, radius) pairs
        vertices: Vec<[f32; 2]>,
        color: [f32; 4],
    },
}

/// Overall intensity bar and playhead
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub intensity_bar_width: f32,
    pub intensity_color: [f32; 4],
    /// Fraction of the track played, if known
    pub playhead: Option<f32>,
}

impl Overlay {
    pub fn new(features: &Features, playhead: Option<f32>, config: &RenderConfig) -> Self {
        let level = features.overall_intensity.clamp(0.0, 1.0);
        Self {
            intensity_bar_width: level * config.canvas_width,
            intensity_color: hsb_to_rgba(map_range(level, 0.0, 1.0, 240.0, 0.0), 100.0, 100.0, 1.0),
            playhead,
        }
    }
}

/// Everything the surface needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub frame_index: u64,
    pub mode: VisualizationMode,
    pub shape: Option<Shape>,
    pub overlay: Option<Overlay>,
    pub placeholder: Option<String>,
}

impl RenderFrame {
    /// Nothing is playing: placeholder only
    pub fn idle(frame_index: u64, mode: VisualizationMode) -> Self {
        Self {
            frame_index,
            mode,
            shape: None,
            overlay: None,
            placeholder: Some(IDLE_PLACEHOLDER.to_string()),
        }
    }

    pub fn active(frame_index: u64, mode: VisualizationMode, shape: Shape, overlay: Overlay) -> Self {
        Self {
            frame_index,
            mode,
            shape: Some(shape),
            overlay: Some(overlay),
            placeholder: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.shape.is_none()
    }

    /// Number of pulses, particles or vertices in the shape
    pub fn entity_count(&self) -> usize {
        match &self.shape {
            Some(Shape::Pulses { pulses }) => pulses.len(),
            Some(Shape::Swarm { particles }) => particles.len(),
            Some(Shape::Blob { vertices, .. }) => vertices.len(),
            Some(Shape::Waveform { points, .. }) => points.len(),
            Some(Shape::Spectrum { bars, .. }) => bars.len(),
            Some(Shape::Haptic { history, .. }) => history.len(),
            Some(Shape::Spectrogram { columns, .. }) => *columns,
            None => 0,
        }
    }
}

/// Linear remap of `value` from one range to another (unclamped)
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Hue in degrees, saturation and brightness in percent, alpha in [0, 1]
pub fn hsb_to_rgba(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> [f32; 4] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let v = (brightness / 100.0).clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    [r + m, g + m, b + m, alpha.clamp(0.0, 1.0)]
}

/// Write spectrogram columns (oldest first) as a grayscale PNG.
///
/// One pixel column per history entry, low frequencies at the bottom.
pub fn write_spectrogram_png<'a, I>(columns: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let columns: Vec<&[f32]> = columns.into_iter().collect();
    let width = columns.len().max(1);
    let height = columns.iter().map(|c| c.len()).max().unwrap_or(0).max(1);

    let mut pixels = vec![0u8; width * height];
    for (x, column) in columns.iter().enumerate() {
        for (bin, value) in column.iter().enumerate() {
            let y = height - 1 - bin;
            let level = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
            pixels[y * width + x] = (level * 255.0).round() as u8;
        }
    }

    image::save_buffer(path, &pixels, width as u32, height as u32, image::ColorType::L8)?;
    info!(path = %path.display(), width, height, "wrote spectrogram");
    Ok(())
}
