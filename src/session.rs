//! Tick loop context.
//!
//! A [`Session`] owns everything that persists between ticks: the track
//! slot, the active mode's entities, the frame counter and the RNG. Each
//! [`Session::tick`] reads playback state, extracts features, maps them and
//! returns one [`RenderFrame`]. Ticks never block.
//!
//! Visual state is frozen while paused and cleared on stop, track switch or
//! mode switch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::audio::{spawn_decode, AudioSource, OfflineSource, PcmBuffer, PendingTrack, Transport};
use crate::error::Result;
use crate::features::{FeatureExtractor, Features};
use crate::params::{AnalysisParams, VisualizerParams};
use crate::render::{Overlay, RenderFrame};
use crate::visuals::{ModeState, SpectrogramTrace, TickContext, VisualizationMode};

/// Builds a playable source once a buffer has been decoded
pub type SourceOpener<S> = Box<dyn Fn(Arc<PcmBuffer>, &AnalysisParams) -> Result<S>>;

/// Track lifecycle: `Unloaded → Loading → Ready | Failed`
pub enum TrackSlot<S> {
    Unloaded,
    Loading(PendingTrack),
    Ready { path: PathBuf, source: S },
    Failed { path: PathBuf, message: String },
}

impl<S> TrackSlot<S> {
    pub fn is_ready(&self) -> bool {
        matches!(self, TrackSlot::Ready { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TrackSlot::Loading(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrackSlot::Unloaded => "unloaded",
            TrackSlot::Loading(_) => "loading",
            TrackSlot::Ready { .. } => "ready",
            TrackSlot::Failed { .. } => "failed",
        }
    }
}

pub struct Session<S: AudioSource + Transport> {
    params: VisualizerParams,
    extractor: FeatureExtractor,
    opener: SourceOpener<S>,
    slot: TrackSlot<S>,
    state: ModeState,
    /// Active ticks since the last reset
    frame_index: u64,
    rng: StdRng,
    /// Start playback as soon as a track becomes ready
    autoplay: bool,
    looping: bool,
    last_features: Option<Features>,
    capture: Option<SpectrogramTrace>,
}

impl Session<OfflineSource> {
    /// Session on the tick clock (headless runs, tests)
    pub fn offline(params: VisualizerParams) -> Result<Self> {
        Self::new(
            params,
            Box::new(
                |buffer: Arc<PcmBuffer>, analysis: &AnalysisParams| -> Result<OfflineSource> {
                    Ok(OfflineSource::new(buffer, analysis))
                },
            ),
        )
    }
}

#[cfg(feature = "playback")]
impl Session<crate::audio::LivePlayback> {
    /// Session following the default output device
    pub fn live(params: VisualizerParams) -> Result<Self> {
        Self::new(params, Box::new(crate::audio::LivePlayback::new))
    }
}

impl<S: AudioSource + Transport> Session<S> {
    pub fn new(params: VisualizerParams, opener: SourceOpener<S>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::new(&params.analysis),
            state: ModeState::new(VisualizationMode::default(), &params),
            rng: StdRng::seed_from_u64(params.render.rng_seed),
            params,
            opener,
            slot: TrackSlot::Unloaded,
            frame_index: 0,
            autoplay: false,
            looping: false,
            last_features: None,
            capture: None,
        })
    }

    pub fn params(&self) -> &VisualizerParams {
        &self.params
    }

    pub fn slot(&self) -> &TrackSlot<S> {
        &self.slot
    }

    pub fn source(&self) -> Option<&S> {
        match &self.slot {
            TrackSlot::Ready { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn mode(&self) -> VisualizationMode {
        self.state.mode()
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Features of the most recent active tick
    pub fn last_features(&self) -> Option<&Features> {
        self.last_features.as_ref()
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// Keep every analysed spectrum (up to `capacity`) for PNG export
    pub fn capture_spectrogram(&mut self, capacity: usize) {
        self.capture = Some(SpectrogramTrace::new(capacity));
    }

    pub fn spectrogram_capture(&self) -> Option<&SpectrogramTrace> {
        self.capture.as_ref()
    }

    /// Start decoding `path` in the background, replacing the current track
    pub fn load(&mut self, path: &Path) {
        self.stop();
        self.slot = TrackSlot::Loading(spawn_decode(path));
    }

    /// Install an already decoded buffer
    pub fn load_buffer(&mut self, path: &Path, buffer: PcmBuffer) -> Result<()> {
        self.stop();
        self.install(path.to_path_buf(), buffer)
    }

    /// Block until a pending load completes
    pub fn wait_for_track(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.slot, TrackSlot::Unloaded) {
            TrackSlot::Loading(pending) => {
                let path = pending.path().to_path_buf();
                let outcome = pending.wait().and_then(|buffer| self.install(path.clone(), buffer));
                if let Err(e) = &outcome {
                    warn!(path = %path.display(), error = %e, "track failed to load");
                    self.slot = TrackSlot::Failed {
                        path,
                        message: e.to_string(),
                    };
                }
                outcome
            }
            other => {
                self.slot = other;
                Ok(())
            }
        }
    }

    /// Check the loader once; never blocks
    fn poll_load(&mut self) {
        let TrackSlot::Loading(pending) = &self.slot else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        let path = pending.path().to_path_buf();
        let outcome = result.and_then(|buffer| self.install(path.clone(), buffer));
        if let Err(e) = outcome {
            warn!(path = %path.display(), error = %e, "track failed to load");
            self.slot = TrackSlot::Failed {
                path,
                message: e.to_string(),
            };
        }
    }

    fn install(&mut self, path: PathBuf, buffer: PcmBuffer) -> Result<()> {
        info!(
            path = %path.display(),
            channels = buffer.channel_count(),
            sample_rate = buffer.sample_rate(),
            duration_s = buffer.duration_seconds(),
            "track ready"
        );
        let mut source = (self.opener)(Arc::new(buffer), &self.params.analysis)?;
        source.set_loop(self.looping);
        if self.autoplay {
            source.play();
        }
        self.slot = TrackSlot::Ready { path, source };
        Ok(())
    }

    /// Switch visualization; the new mode starts empty
    pub fn set_mode(&mut self, mode: VisualizationMode) {
        if mode == self.state.mode() {
            return;
        }
        debug!(?mode, "switching mode");
        self.state = ModeState::new(mode, &self.params);
        self.frame_index = 0;
    }

    pub fn play(&mut self) {
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.play();
        }
    }

    /// Pause playback; visuals freeze where they are
    pub fn pause(&mut self) {
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.pause();
        }
    }

    /// Stop and rewind; visuals are cleared
    pub fn stop(&mut self) {
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.stop();
        }
        self.clear_visuals();
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.set_loop(looping);
        }
    }

    pub fn seek(&mut self, seconds: f32) {
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.seek(seconds);
        }
    }

    pub fn set_volume(&mut self, percent: f32) {
        if let TrackSlot::Ready { source, .. } = &mut self.slot {
            source.set_volume(percent);
        }
    }

    fn clear_visuals(&mut self) {
        self.state.reset();
        self.frame_index = 0;
        self.last_features = None;
    }

    /// Run one tick of the loop
    pub fn tick(&mut self) -> RenderFrame {
        self.poll_load();

        let mode = self.state.mode();
        let TrackSlot::Ready { source, .. } = &mut self.slot else {
            return RenderFrame::idle(self.frame_index, mode);
        };
        if !source.is_playing() {
            return RenderFrame::idle(self.frame_index, mode);
        }

        // Tick-clocked sources consume one tick of audio first
        let samples = self.params.render.samples_per_tick(source.sample_rate());
        source.advance_clock(samples);
        if !source.is_playing() {
            debug!("track finished");
            return RenderFrame::idle(self.frame_index, mode);
        }

        let frame = source.analysis_frame();
        let features = self.extractor.extract(&*source, &frame);
        let playhead = source.playhead_fraction();

        let mut ctx = TickContext {
            features: &features,
            frame: &frame,
            frame_index: self.frame_index,
            render: &self.params.render,
            rng: &mut self.rng,
        };
        self.state.update(&mut ctx);

        if let Some(capture) = &mut self.capture {
            capture.update(&frame.frequency_domain);
        }

        let shape = self.state.shape(&frame, &self.params.render);
        let overlay = Overlay::new(&features, playhead, &self.params.render);
        let out = RenderFrame::active(self.frame_index, mode, shape, overlay);

        trace!(
            frame = self.frame_index,
            overall = features.overall_intensity,
            left = features.left.intensity,
            right = features.right.intensity,
            entities = out.entity_count(),
            "tick"
        );

        self.last_features = Some(features);
        self.frame_index += 1;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_buffer(frames: usize) -> PcmBuffer {
        let wave: Vec<f32> = (0..frames)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        PcmBuffer::from_channels(vec![wave.clone(), wave], 44100).unwrap()
    }

    fn ready_session(mode: VisualizationMode) -> Session<OfflineSource> {
        let mut session = Session::offline(VisualizerParams::default()).unwrap();
        session.set_mode(mode);
        session
            .load_buffer(Path::new("square.wav"), square_buffer(44100))
            .unwrap();
        session
    }

    #[test]
    fn test_idle_without_track() {
        let mut session = Session::offline(VisualizerParams::default()).unwrap();
        let frame = session.tick();
        assert!(frame.is_idle());
        assert!(frame.placeholder.is_some());
        assert_eq!(session.slot().label(), "unloaded");
    }

    #[test]
    fn test_ready_but_not_playing_is_idle() {
        let mut session = ready_session(VisualizationMode::Pulses);
        assert!(session.slot().is_ready());
        assert!(session.tick().is_idle());
        assert_eq!(session.frame_index(), 0);
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut session = ready_session(VisualizationMode::Pulses);
        session.play();
        for _ in 0..5 {
            session.tick();
        }
        let ModeState::Pulses(field) = session.state() else {
            panic!("expected pulses");
        };
        let before = field.pulses().to_vec();
        assert!(!before.is_empty());

        session.pause();
        for _ in 0..10 {
            assert!(session.tick().is_idle());
        }
        let ModeState::Pulses(field) = session.state() else {
            panic!("expected pulses");
        };
        assert_eq!(field.pulses(), before.as_slice());
        assert_eq!(session.frame_index(), 5);
    }

    #[test]
    fn test_stop_clears_state() {
        let mut session = ready_session(VisualizationMode::Swarm);
        session.play();
        session.tick();
        session.stop();
        let ModeState::Swarm(swarm) = session.state() else {
            panic!("expected swarm");
        };
        assert!(swarm.particles().is_empty());
        assert_eq!(session.frame_index(), 0);
        assert_eq!(session.source().unwrap().current_time_samples(), 0);
    }

    #[test]
    fn test_mode_switch_starts_empty() {
        let mut session = ready_session(VisualizationMode::Pulses);
        session.play();
        session.tick();
        session.set_mode(VisualizationMode::Blob);
        assert_eq!(session.mode(), VisualizationMode::Blob);
        assert_eq!(session.frame_index(), 0);

        let frame = session.tick();
        assert_eq!(frame.mode, VisualizationMode::Blob);
        assert_eq!(frame.entity_count(), 80);
    }

    #[test]
    fn test_playhead_advances_per_tick() {
        let mut session = ready_session(VisualizationMode::Waveform);
        session.play();
        session.tick();
        session.tick();
        assert_eq!(session.source().unwrap().current_time_samples(), 2 * 735);
        let overlay = session.tick().overlay.unwrap();
        assert!(overlay.playhead.unwrap() > 0.0);
    }

    #[test]
    fn test_load_failure_moves_to_failed() {
        let mut session = Session::offline(VisualizerParams::default()).unwrap();
        session.load(Path::new("/nonexistent/missing.wav"));
        assert!(session.slot().is_loading());
        assert!(session.wait_for_track().is_err());
        assert_eq!(session.slot().label(), "failed");
        assert!(session.tick().is_idle());
    }

    #[test]
    fn test_spectrogram_capture() {
        let mut session = ready_session(VisualizationMode::Pulses);
        session.capture_spectrogram(16);
        session.play();
        for _ in 0..20 {
            session.tick();
        }
        let capture = session.spectrogram_capture().unwrap();
        assert_eq!(capture.history().len(), 16);
    }
}
