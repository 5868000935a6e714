//! Decoded, de-interleaved PCM.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, VisualizerError};

/// Decoded track: one `Vec<f32>` per channel, samples in [-1, 1]
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Wrap already de-interleaved channels (all channels must share a length)
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(VisualizerError::UnsupportedAudio(
                "no channels".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(VisualizerError::UnsupportedAudio(
                "sample rate is 0".to_string(),
            ));
        }
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(VisualizerError::UnsupportedAudio(
                "channels differ in length".to_string(),
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Decode a WAV file
    pub fn from_wav_file(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let buffer = Self::from_wav_reader(reader)?;
        debug!(
            path = %path.display(),
            channels = buffer.channel_count(),
            sample_rate = buffer.sample_rate,
            seconds = buffer.duration_seconds(),
            "decoded track"
        );
        Ok(buffer)
    }

    /// Decode WAV data from any reader
    pub fn from_wav_reader<R: Read>(mut reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(VisualizerError::UnsupportedAudio(
                "WAV header declares 0 channels".to_string(),
            ));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample.clamp(-1.0, 1.0));
            }
        }

        Self::from_channels(channels, spec.sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// `[start, start + count)` of one channel, truncated to the buffer
    pub fn window(&self, channel: usize, start: usize, count: usize) -> Option<&[f32]> {
        let data = self.channels.get(channel)?;
        let start = start.min(data.len());
        let end = start.saturating_add(count).min(data.len());
        Some(&data[start..end])
    }

    /// Channel average at one sample index (0 outside the buffer)
    pub fn mixed_sample(&self, index: usize) -> f32 {
        let sum: f32 = self
            .channels
            .iter()
            .map(|c| c.get(index).copied().unwrap_or(0.0))
            .sum();
        sum / self.channels.len() as f32
    }

    /// Whole track mixed down to mono
    pub fn mono_mix(&self) -> Vec<f32> {
        (0..self.frames()).map(|i| self.mixed_sample(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rejects_ragged_channels() {
        let result = PcmBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]], 44100);
        assert!(matches!(result, Err(VisualizerError::UnsupportedAudio(_))));
    }

    #[test]
    fn test_window_truncates_at_end() {
        let buffer = PcmBuffer::from_channels(vec![vec![0.1, 0.2, 0.3, 0.4]], 8).unwrap();
        assert_eq!(buffer.window(0, 2, 10).unwrap(), &[0.3, 0.4]);
        assert_eq!(buffer.window(0, 9, 10).unwrap().len(), 0);
        assert!(buffer.window(1, 0, 2).is_none());
        assert_eq!(buffer.duration_seconds(), 0.5);
    }

    #[test]
    fn test_mono_mix_averages_channels() {
        let buffer =
            PcmBuffer::from_channels(vec![vec![1.0, 0.0], vec![0.0, -1.0]], 44100).unwrap();
        assert_eq!(buffer.mono_mix(), vec![0.5, -0.5]);
        assert_eq!(buffer.mixed_sample(5), 0.0);
    }

    #[test]
    fn test_decodes_interleaved_int_wav() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..4 {
                writer.write_sample(i16::MAX).unwrap(); // left
                writer.write_sample(0i16).unwrap(); // right
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);

        let reader = hound::WavReader::new(cursor).unwrap();
        let buffer = PcmBuffer::from_wav_reader(reader).unwrap();

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frames(), 4);
        assert!(buffer.channel(0).unwrap().iter().all(|&s| s > 0.99));
        assert!(buffer.channel(1).unwrap().iter().all(|&s| s == 0.0));
    }
}
