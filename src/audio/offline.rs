//! Tick-clocked source for headless runs and tests.

use std::sync::Arc;

use tracing::debug;

use super::{Analyzer, AudioSource, PcmBuffer, Playhead, Transport};
use crate::params::AnalysisParams;

/// Plays a decoded buffer on a virtual clock advanced by the tick loop
pub struct OfflineSource {
    buffer: Arc<PcmBuffer>,
    analyzer: Analyzer,
    playhead: Playhead,
}

impl OfflineSource {
    pub fn new(buffer: Arc<PcmBuffer>, params: &AnalysisParams) -> Self {
        let playhead = Playhead::new(buffer.frames());
        Self {
            buffer,
            analyzer: Analyzer::new(params),
            playhead,
        }
    }

    /// Mixed samples heard just before the playhead, scaled by volume
    fn recent_mix(&self) -> Vec<f32> {
        let end = self.playhead.position();
        let start = end.saturating_sub(self.analyzer.fft_size());
        let gain = self.playhead.volume();
        (start..end)
            .map(|i| self.buffer.mixed_sample(i) * gain)
            .collect()
    }
}

impl AudioSource for OfflineSource {
    fn current_time_samples(&self) -> usize {
        self.playhead.position()
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
        self.playhead.is_playing()
    }

    fn duration_seconds(&self) -> f32 {
        self.buffer.duration_seconds()
    }

    fn advance_clock(&mut self, samples: usize) {
        if self.playhead.advance(samples) {
            debug!("track ended");
            self.analyzer.reset();
        }
    }
}

impl Transport for OfflineSource {
    fn play(&mut self) {
        self.playhead.play();
    }

    fn pause(&mut self) {
        self.playhead.pause();
    }

    fn stop(&mut self) {
        self.playhead.stop();
        self.analyzer.reset();
    }

    fn set_loop(&mut self, looping: bool) {
        self.playhead.set_loop(looping);
    }

    fn seek(&mut self, seconds: f32) {
        let target = (seconds.max(0.0) * self.buffer.sample_rate() as f32) as usize;
        self.playhead.seek(target);
        self.analyzer.reset();
    }

    fn set_volume(&mut self, percent: f32) {
        self.playhead.set_volume_percent(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(frames: usize) -> OfflineSource {
        let buffer = PcmBuffer::from_channels(vec![vec![0.5; frames], vec![-0.5; frames]], 44100)
            .unwrap();
        OfflineSource::new(Arc::new(buffer), &AnalysisParams::default())
    }

    #[test]
    fn test_clock_only_moves_while_playing() {
        let mut src = source(10_000);
        src.advance_clock(735);
        assert_eq!(src.current_time_samples(), 0);

        src.play();
        src.advance_clock(735);
        assert_eq!(src.current_time_samples(), 735);
    }

    #[test]
    fn test_time_domain_reflects_mix_and_volume() {
        let buffer =
            PcmBuffer::from_channels(vec![vec![0.8; 4096], vec![0.4; 4096]], 44100).unwrap();
        let mut src = OfflineSource::new(Arc::new(buffer), &AnalysisParams::default());
        src.play();
        src.advance_clock(3000);
        src.set_volume(50.0);

        let frame = src.analyze_time_domain();
        assert_eq!(frame.len(), 2048);
        assert!(frame.iter().all(|&s| (s - 0.3).abs() < 1e-6));
    }

    #[test]
    fn test_seek_and_playhead_fraction() {
        let mut src = source(44_100);
        src.seek(0.5);
        assert_eq!(src.current_time_samples(), 22_050);
        assert!((src.playhead_fraction().unwrap() - 0.5).abs() < 1e-4);

        src.seek(10.0);
        assert_eq!(src.current_time_samples(), 44_100);
    }

    #[test]
    fn test_channel_pcm_truncates() {
        let src = source(100);
        assert_eq!(src.channel_pcm(0, 90, 50).unwrap().len(), 10);
        assert!(src.channel_pcm(2, 0, 10).is_none());
    }
}
