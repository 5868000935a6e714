//! Live playback through the default output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::{Analyzer, AudioSource, PcmBuffer, Playhead, RateStep, Transport};
use crate::error::{Result, VisualizerError};
use crate::params::AnalysisParams;

/// Plays a decoded buffer through cpal; the stream callback owns the clock
pub struct LivePlayback {
    buffer: Arc<PcmBuffer>,
    analyzer: Analyzer,

    /// Shared with the output callback
    playhead: Arc<Mutex<Playhead>>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl LivePlayback {
    /// Open the default output device at its own rate; the track is stepped
    /// to match
    pub fn new(buffer: Arc<PcmBuffer>, params: &AnalysisParams) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VisualizerError::AudioDevice("No audio output device found".into()))?;

        let default_config = device
            .default_output_config()
            .map_err(|e| VisualizerError::AudioDevice(format!("Failed to get audio config: {e}")))?;

        let out_channels = default_config.channels() as usize;
        let device_rate = default_config.sample_rate().0;
        let config: cpal::StreamConfig = default_config.into();

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            track_rate = buffer.sample_rate(),
            channels = out_channels,
            "opening output stream"
        );

        let mut step = RateStep::new(buffer.sample_rate(), device_rate);

        let playhead = Arc::new(Mutex::new(Playhead::new(buffer.frames())));
        let playhead_cb = Arc::clone(&playhead);
        let buffer_cb = Arc::clone(&buffer);

        // Build audio output stream
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut head = playhead_cb.lock().unwrap_or_else(PoisonError::into_inner);
                    let last_channel = buffer_cb.channel_count() - 1;

                    for frame in data.chunks_mut(out_channels) {
                        if !head.is_playing() {
                            frame.fill(0.0);
                            continue;
                        }
                        let position = head.position();
                        let gain = head.volume();
                        for (out, sample) in frame.iter_mut().enumerate() {
                            let source = buffer_cb.channel(out.min(last_channel));
                            let value = source
                                .and_then(|c| c.get(position))
                                .copied()
                                .unwrap_or(0.0);
                            *sample = value * gain;
                        }
                        head.advance(step.frame());
                    }
                },
                |err| warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| VisualizerError::AudioDevice(format!("Failed to build audio stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VisualizerError::AudioDevice(format!("Failed to start audio stream: {e}")))?;

        Ok(Self {
            buffer,
            analyzer: Analyzer::new(params),
            playhead,
            _stream: stream,
        })
    }

    fn head(&self) -> MutexGuard<'_, Playhead> {
        self.playhead.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recent_mix(&self) -> Vec<f32> {
        let (end, gain) = {
            let head = self.head();
            (head.position(), head.volume())
        };
        let start = end.saturating_sub(self.analyzer.fft_size());
        (start..end)
            .map(|i| self.buffer.mixed_sample(i) * gain)
            .collect()
    }
}

impl AudioSource for LivePlayback {
    fn current_time_samples(&self) -> usize {
        self.head().position()
    }

    fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    fn channel_count(&self) -> usize {
        self.buffer.channel_count()
    }

    fn channel_pcm(&self, channel: usize, start: usize, count: usize) -> Option<&[f32]> {
        self.buffer.window(channel, start, count)
    }

    fn analyze_frequency_domain(&mut self) -> Vec<f32> {
        let recent = self.recent_mix();
        self.analyzer.frequency_domain(&recent)
    }

    fn analyze_time_domain(&mut self) -> Vec<f32> {
        self.analyzer.time_domain(&self.recent_mix())
    }

    fn is_playing(&self) -> bool {
        self.head().is_playing()
    }

    fn duration_seconds(&self) -> f32 {
        self.buffer.duration_seconds()
    }
}

impl Transport for LivePlayback {
    fn play(&mut self) {
        self.head().play();
    }

    fn pause(&mut self) {
        self.head().pause();
    }

    fn stop(&mut self) {
        self.head().stop();
        self.analyzer.reset();
    }

    fn set_loop(&mut self, looping: bool) {
        self.head().set_loop(looping);
    }

    fn seek(&mut self, seconds: f32) {
        let target = (seconds.max(0.0) * self.buffer.sample_rate() as f32) as usize;
        self.head().seek(target);
        self.analyzer.reset();
    }

    fn set_volume(&mut self, percent: f32) {
        self.head().set_volume_percent(percent);
    }
}
