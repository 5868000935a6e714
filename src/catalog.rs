//! Pattern metadata catalog.
//!
//! Per-file loudness and stereo statistics stored as
//! `{"patterns": [...]}` JSON, generated from decoded PCM and browsed with
//! search, range filters and sorting.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audio::PcmBuffer;
use crate::error::Result;

/// RMS analysis frame (samples)
pub const RMS_FRAME: usize = 2048;

/// RMS analysis hop (samples)
pub const RMS_HOP: usize = 512;

/// Summary statistics for one audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMetadata {
    pub filename: String,
    pub path: String,
    /// Mean frame RMS of the mono mix
    pub rms_mean: f64,
    /// Seconds
    pub duration: f64,
    /// -1 fully left, 0 centre, +1 fully right
    pub stereo_balance: f64,
    /// Std-dev of per-frame balance, 0 = static image
    pub stereo_movement: f64,
}

impl PatternMetadata {
    pub fn analyze(filename: &str, path: &str, buffer: &PcmBuffer) -> Self {
        let mono = buffer.mono_mix();
        let rms = frame_rms(&mono, RMS_FRAME, RMS_HOP);

        let (balance, movement) = match (buffer.channel(0), buffer.channel(1)) {
            (Some(left), Some(right)) => {
                let left_rms = frame_rms(left, RMS_FRAME, RMS_HOP);
                let right_rms = frame_rms(right, RMS_FRAME, RMS_HOP);
                (
                    stereo_balance(mean(&left_rms), mean(&right_rms)),
                    stereo_movement(&left_rms, &right_rms),
                )
            }
            _ => (0.0, 0.0),
        };

        Self {
            filename: filename.to_string(),
            path: path.to_string(),
            rms_mean: mean(&rms),
            duration: buffer.duration_seconds() as f64,
            stereo_balance: balance,
            stereo_movement: movement,
        }
    }

    /// Decode a WAV file and analyse it
    pub fn from_wav_file(path: &Path) -> Result<Self> {
        let buffer = PcmBuffer::from_wav_file(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::analyze(&filename, &path.to_string_lossy(), &buffer))
    }
}

/// RMS of `frame`-long windows centred every `hop` samples.
///
/// The signal is zero-padded by `frame / 2` on both sides, so edge frames
/// read partly silence and a track of `n` samples yields `1 + n / hop`
/// frames. This matches the values already stored in existing catalogs.
/// An empty signal yields nothing.
pub fn frame_rms(samples: &[f32], frame: usize, hop: usize) -> Vec<f64> {
    if samples.is_empty() || frame == 0 || hop == 0 {
        return Vec::new();
    }
    let pad = frame / 2;
    let count = 1 + (samples.len() + 2 * pad - frame) / hop;
    (0..count)
        .map(|t| {
            // Window [t * hop - pad, t * hop - pad + frame) clipped to the signal
            let centre = t * hop;
            let start = centre.saturating_sub(pad);
            let end = (centre + frame - pad).min(samples.len());
            let sum: f64 = samples[start..end]
                .iter()
                .map(|s| (*s as f64) * (*s as f64))
                .sum();
            (sum / frame as f64).sqrt()
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// `(R - L) / (R + L)` clamped to [-1, 1]; silence is centred
pub fn stereo_balance(left_rms: f64, right_rms: f64) -> f64 {
    let total = left_rms + right_rms;
    if total <= 0.0 {
        return 0.0;
    }
    ((right_rms - left_rms) / total).clamp(-1.0, 1.0)
}

/// Population std-dev of per-frame balance, clamped to [0, 1]
pub fn stereo_movement(left_rms: &[f64], right_rms: &[f64]) -> f64 {
    let balances: Vec<f64> = left_rms
        .iter()
        .zip(right_rms)
        .map(|(l, r)| stereo_balance(*l, *r))
        .collect();
    if balances.is_empty() {
        return 0.0;
    }
    let m = mean(&balances);
    let variance = balances.iter().map(|b| (b - m) * (b - m)).sum::<f64>() / balances.len() as f64;
    variance.sqrt().clamp(0.0, 1.0)
}

/// Inclusive range; open ends accept everything
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    /// Case-insensitive filename substring
    pub search: Option<String>,
    pub rms: RangeFilter,
    pub duration: RangeFilter,
    pub balance: RangeFilter,
    pub movement: RangeFilter,
}

impl PatternFilter {
    pub fn matches(&self, pattern: &PatternMetadata) -> bool {
        let name_ok = match &self.search {
            Some(needle) if !needle.is_empty() => pattern
                .filename
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        name_ok
            && self.rms.contains(pattern.rms_mean)
            && self.duration.contains(pattern.duration)
            && self.balance.contains(pattern.stereo_balance)
            && self.movement.contains(pattern.stereo_movement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Filename,
    Rms,
    Duration,
    Balance,
    Movement,
}

impl SortKey {
    fn compare(self, a: &PatternMetadata, b: &PatternMetadata) -> Ordering {
        match self {
            SortKey::Filename => a.filename.cmp(&b.filename),
            SortKey::Rms => a.rms_mean.total_cmp(&b.rms_mean),
            SortKey::Duration => a.duration.total_cmp(&b.duration),
            SortKey::Balance => a.stereo_balance.total_cmp(&b.stereo_balance),
            SortKey::Movement => a.stereo_movement.total_cmp(&b.stereo_movement),
        }
    }
}

/// Outcome of a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub patterns: Vec<PatternMetadata>,
}

impl Catalog {
    /// Load from disk; a missing file is an empty catalog
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "metadata file not found, starting empty");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save to disk, copying any previous file to `<name>.json.backup` first
    pub fn save(&self, path: &Path) -> Result<()> {
        if path.exists() {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            info!(path = %backup.display(), "created backup");
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), patterns = self.patterns.len(), "saved metadata");
        Ok(())
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.patterns.iter().any(|p| p.filename == filename)
    }

    /// Add new records. With `replace`, records with a known filename
    /// overwrite the old one; otherwise only unknown filenames are added.
    pub fn merge(&mut self, records: Vec<PatternMetadata>, replace: bool) {
        for record in records {
            match self.patterns.iter_mut().find(|p| p.filename == record.filename) {
                Some(existing) if replace => *existing = record,
                Some(_) => {}
                None => self.patterns.push(record),
            }
        }
        self.patterns.sort_by(|a, b| a.filename.cmp(&b.filename));
    }

    /// Analyse `files` and merge the results. Without `all`, files already
    /// in the catalog are skipped.
    pub fn scan(&mut self, files: &[PathBuf], all: bool) -> ScanReport {
        let mut report = ScanReport::default();
        let mut records = Vec::new();

        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !all && self.contains(&name) {
                report.skipped += 1;
                continue;
            }
            match PatternMetadata::from_wav_file(file) {
                Ok(meta) => {
                    info!(
                        file = %name,
                        rms = meta.rms_mean,
                        duration_s = meta.duration,
                        balance = meta.stereo_balance,
                        movement = meta.stereo_movement,
                        "analysed"
                    );
                    records.push(meta);
                    report.processed += 1;
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "failed to analyse");
                    report.errors += 1;
                }
            }
        }

        self.merge(records, all);
        report
    }

    /// Matching records, ordered by `key`
    pub fn query(&self, filter: &PatternFilter, key: SortKey, descending: bool) -> Vec<&PatternMetadata> {
        let mut hits: Vec<&PatternMetadata> =
            self.patterns.iter().filter(|p| filter.matches(p)).collect();
        hits.sort_by(|a, b| {
            let ord = key.compare(a, b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        hits
    }
}

/// `pattern_metadata.json` → `pattern_metadata.json.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, rms: f64, duration: f64, balance: f64) -> PatternMetadata {
        PatternMetadata {
            filename: name.to_string(),
            path: format!("audio_files/{name}"),
            rms_mean: rms,
            duration,
            stereo_balance: balance,
            stereo_movement: 0.0,
        }
    }

    fn write_wav(path: &Path, left: f32, right: f32, frames: usize) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..frames {
            writer.write_sample(left).unwrap();
            writer.write_sample(right).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_frame_rms() {
        let rms = frame_rms(&[0.5; 4096], 2048, 512);
        assert_eq!(rms.len(), 9);
        // Fully inside the signal
        assert!((rms[4] - 0.5).abs() < 1e-9);
        // First frame is half padding
        assert!((rms[0] - 0.5 * 0.5f64.sqrt()).abs() < 1e-9);
        assert!((rms[8] - 0.5 * 0.5f64.sqrt()).abs() < 1e-9);
        assert!(frame_rms(&[], 2048, 512).is_empty());
    }

    #[test]
    fn test_frame_rms_short_signal_is_padded() {
        let rms = frame_rms(&[0.5; 100], 2048, 512);
        assert_eq!(rms.len(), 1);
        assert!((rms[0] - (100.0 * 0.25 / 2048.0f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_balance_formula() {
        assert_eq!(stereo_balance(0.0, 0.0), 0.0);
        assert_eq!(stereo_balance(1.0, 0.0), -1.0);
        assert!((stereo_balance(0.25, 0.75) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_movement_of_static_and_panning_images() {
        assert_eq!(stereo_movement(&[0.5; 10], &[0.5; 10]), 0.0);
        // Alternating hard left / hard right
        let left = [1.0, 0.0, 1.0, 0.0];
        let right = [0.0, 1.0, 0.0, 1.0];
        assert!((stereo_movement(&left, &right) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_mono_is_centred() {
        let buffer = PcmBuffer::from_channels(vec![vec![0.5; 8000]], 8000).unwrap();
        let meta = PatternMetadata::analyze("a.wav", "a.wav", &buffer);
        assert_eq!(meta.stereo_balance, 0.0);
        assert_eq!(meta.stereo_movement, 0.0);
        assert!((meta.duration - 1.0).abs() < 1e-6);
        // 16 centred frames, the outer ones partly padding
        assert!((meta.rms_mean - 0.479_224_9).abs() < 1e-6);
    }

    #[test]
    fn test_merge_respects_replace() {
        let mut catalog = Catalog {
            patterns: vec![record("b.wav", 0.1, 1.0, 0.0)],
        };
        catalog.merge(
            vec![record("b.wav", 0.9, 1.0, 0.0), record("a.wav", 0.2, 2.0, 0.0)],
            false,
        );
        assert_eq!(catalog.patterns.len(), 2);
        assert_eq!(catalog.patterns[0].filename, "a.wav");
        assert_eq!(catalog.patterns[1].rms_mean, 0.1);

        catalog.merge(vec![record("b.wav", 0.9, 1.0, 0.0)], true);
        assert_eq!(catalog.patterns[1].rms_mean, 0.9);
    }

    #[test]
    fn test_save_writes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pattern_metadata.json");

        let mut catalog = Catalog::load(&path).unwrap();
        assert!(catalog.patterns.is_empty());
        catalog.merge(vec![record("a.wav", 0.2, 2.0, 0.0)], false);
        catalog.save(&path).unwrap();
        assert!(!backup_path(&path).exists());

        catalog.merge(vec![record("b.wav", 0.3, 3.0, 0.0)], false);
        catalog.save(&path).unwrap();

        let backup: Catalog =
            serde_json::from_str(&fs::read_to_string(backup_path(&path)).unwrap()).unwrap();
        assert_eq!(backup.patterns.len(), 1);
        assert_eq!(Catalog::load(&path).unwrap().patterns.len(), 2);
    }

    #[test]
    fn test_scan_skips_known_files() {
        let dir = tempfile::tempdir().unwrap();
        let left_heavy = dir.path().join("left.wav");
        let right_heavy = dir.path().join("right.wav");
        write_wav(&left_heavy, 0.8, 0.2, 4000);
        write_wav(&right_heavy, 0.1, 0.9, 4000);
        let missing = dir.path().join("missing.wav");

        let mut catalog = Catalog::default();
        let report = catalog.scan(&[left_heavy.clone(), right_heavy.clone(), missing], false);
        assert_eq!(report.processed, 2);
        assert_eq!(report.errors, 1);
        assert!(catalog.patterns[0].stereo_balance < -0.5);
        assert!(catalog.patterns[1].stereo_balance > 0.7);

        let again = catalog.scan(&[left_heavy], false);
        assert_eq!(again.skipped, 1);
        assert_eq!(again.processed, 0);
    }

    #[test]
    fn test_query_filters_and_sorts() {
        let catalog = Catalog {
            patterns: vec![
                record("Kick_Long.wav", 0.30, 8.0, -0.2),
                record("kick_short.wav", 0.10, 1.0, 0.1),
                record("pad.wav", 0.05, 12.0, 0.0),
            ],
        };

        let filter = PatternFilter {
            search: Some("KICK".to_string()),
            ..PatternFilter::default()
        };
        let hits = catalog.query(&filter, SortKey::Rms, true);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].filename, "Kick_Long.wav");

        let filter = PatternFilter {
            duration: RangeFilter::new(Some(1.0), Some(8.0)),
            ..PatternFilter::default()
        };
        let hits = catalog.query(&filter, SortKey::Duration, false);
        assert_eq!(
            hits.iter().map(|p| p.filename.as_str()).collect::<Vec<_>>(),
            vec!["kick_short.wav", "Kick_Long.wav"]
        );
    }
}
