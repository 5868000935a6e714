//! Error types for loading, playback and catalog operations.
//!
//! The per-tick pipeline never fails; these cover the edges around it.

use thiserror::Error;

/// Result type alias for fallible visualizer operations
pub type Result<T> = std::result::Result<T, VisualizerError>;

#[derive(Error, Debug)]
pub enum VisualizerError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] hound::Error),

    /// Decoded file carries no usable audio
    #[error("Unsupported audio: {0}")]
    UnsupportedAudio(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid parameter value
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Audio device or stream error
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Background loader went away before reporting
    #[error("Track loader disconnected")]
    LoaderDisconnected,
}
