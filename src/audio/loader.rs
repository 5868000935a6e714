//! Background track decoding with a single completion event.

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use super::PcmBuffer;
use crate::error::{Result, VisualizerError};

/// A decode running on a worker thread
pub struct PendingTrack {
    path: PathBuf,
    rx: Receiver<Result<PcmBuffer>>,
}

/// Start decoding `path` off the tick thread
pub fn spawn_decode(path: &Path) -> PendingTrack {
    let (tx, rx) = bounded(1);
    let worker_path = path.to_path_buf();

    info!(path = %path.display(), "loading track");
    thread::spawn(move || {
        let result = PcmBuffer::from_wav_file(&worker_path);
        // Receiver dropped means the load was superseded
        if tx.send(result).is_err() {
            debug!(path = %worker_path.display(), "load superseded before completion");
        }
    });

    PendingTrack {
        path: path.to_path_buf(),
        rx,
    }
}

impl PendingTrack {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check for completion
    pub fn poll(&self) -> Option<Result<PcmBuffer>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(VisualizerError::LoaderDisconnected)),
        }
    }

    /// Block until the decode finishes
    pub fn wait(self) -> Result<PcmBuffer> {
        self.rx
            .recv()
            .map_err(|_| VisualizerError::LoaderDisconnected)?
    }
}
