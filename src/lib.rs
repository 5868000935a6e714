//! hapticwave - audio-reactive stereo visualizer core
//!
//! Extracts per-tick features from a playing track and maps them to
//! render-ready parameters: stereo pulses, a particle swarm, a blob ring and
//! the classic analyser traces.

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod features;
pub mod logging;
pub mod noise;
pub mod params;
pub mod render;
pub mod session;
pub mod visuals;

pub use audio::{AnalysisFrame, AudioSource, Side, Transport};
pub use error::{Result, VisualizerError};
pub use features::{FeatureExtractor, Features};
pub use render::RenderFrame;
pub use session::Session;
pub use visuals::VisualizationMode;
