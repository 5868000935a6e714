//! Transport state shared by offline and live sources.

/// Playback position and transport flags
#[derive(Debug, Clone)]
pub struct Playhead {
    /// Position in samples (per channel)
    position: usize,
    /// Track length in samples
    length: usize,
    playing: bool,
    looping: bool,
    /// Linear gain (0.0 - 1.0)
    volume: f32,
}

impl Playhead {
    pub fn new(length: usize) -> Self {
        Self {
            position: 0,
            length,
            playing: false,
            looping: false,
            volume: 1.0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Start or resume; an empty track never plays
    pub fn play(&mut self) {
        self.playing = self.length > 0;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.position = 0;
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.length);
    }

    /// Volume in percent (0-100)
    pub fn set_volume_percent(&mut self, percent: f32) {
        self.volume = if percent.is_finite() {
            (percent / 100.0).clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Move forward `samples` while playing.
    ///
    /// Returns true when the track ran out without looping (playback then
    /// stops and rewinds).
    pub fn advance(&mut self, samples: usize) -> bool {
        if !self.playing {
            return false;
        }
        self.position += samples;
        if self.position < self.length {
            return false;
        }
        if self.looping && self.length > 0 {
            self.position %= self.length;
            false
        } else {
            self.stop();
            true
        }
    }
}

/// Track samples consumed per output frame when the device runs at a
/// different rate than the track (nearest-sample playback)
#[derive(Debug, Clone)]
pub struct RateStep {
    ratio: f64,
    /// Fractional track samples not yet consumed
    carry: f64,
}

impl RateStep {
    pub fn new(track_rate_hz: u32, device_rate_hz: u32) -> Self {
        Self {
            ratio: track_rate_hz as f64 / device_rate_hz.max(1) as f64,
            carry: 0.0,
        }
    }

    /// Whole track samples to advance after one output frame
    pub fn frame(&mut self) -> usize {
        self.carry += self.ratio;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as usize
    }
}
