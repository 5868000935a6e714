//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::catalog::{PatternFilter, RangeFilter, SortKey};
use crate::error::Result;
use crate::params::VisualizerParams;
use crate::visuals::VisualizationMode;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "hapticwave")]
#[command(about = "Audio-reactive stereo visualizer core", long_about = None)]
pub struct Args {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// JSON file overriding any subset of the visualizer parameters
    #[arg(long, global = true, value_name = "FILE")]
    pub params: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Step a WAV file on the tick clock and emit render frames
    Render(RenderArgs),
    /// Play a WAV file through the default output device
    Play(PlayArgs),
    /// Manage the pattern metadata catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RenderArgs {
    /// WAV file to render
    pub wav: PathBuf,

    /// Number of ticks to run
    #[arg(long, conflicts_with = "seconds")]
    pub ticks: Option<u64>,

    /// Seconds of playback to run (default: the whole track)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Visualization mode
    #[arg(long, value_enum, default_value_t = VisualizationMode::Pulses)]
    pub mode: VisualizationMode,

    /// Write every render frame as JSON Lines
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,

    /// Export the spectrogram of the run as PNG
    #[arg(long, value_name = "FILE")]
    pub spectrogram: Option<PathBuf>,

    /// Loop the track
    #[arg(long = "loop")]
    pub looping: bool,

    /// Playback volume in percent
    #[arg(long, default_value_t = 100.0)]
    pub volume: f32,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlayArgs {
    /// WAV file to play
    pub wav: PathBuf,

    /// Visualization mode
    #[arg(long, value_enum, default_value_t = VisualizationMode::Pulses)]
    pub mode: VisualizationMode,

    /// Stop after this many seconds
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Loop the track
    #[arg(long = "loop")]
    pub looping: bool,

    /// Playback volume in percent
    #[arg(long, default_value_t = 100.0)]
    pub volume: f32,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Analyse WAV files and add them to the catalog
    Scan {
        /// Catalog JSON file
        metadata: PathBuf,

        /// WAV files to analyse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Re-analyse files already in the catalog
        #[arg(long)]
        all: bool,
    },
    /// Print catalog entries matching the filters
    List(ListArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Catalog JSON file
    pub metadata: PathBuf,

    /// Case-insensitive filename search
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub min_rms: Option<f64>,
    #[arg(long)]
    pub max_rms: Option<f64>,

    /// Seconds
    #[arg(long)]
    pub min_duration: Option<f64>,
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// -1 (left) to 1 (right)
    #[arg(long, allow_hyphen_values = true)]
    pub min_balance: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_balance: Option<f64>,

    #[arg(long)]
    pub min_movement: Option<f64>,
    #[arg(long)]
    pub max_movement: Option<f64>,

    /// Sort key
    #[arg(long, value_enum, default_value_t = SortKey::Filename)]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl ListArgs {
    /// Filter built from the search and range options
    pub fn filter(&self) -> PatternFilter {
        PatternFilter {
            search: self.search.clone(),
            rms: RangeFilter::new(self.min_rms, self.max_rms),
            duration: RangeFilter::new(self.min_duration, self.max_duration),
            balance: RangeFilter::new(self.min_balance, self.max_balance),
            movement: RangeFilter::new(self.min_movement, self.max_movement),
        }
    }
}

impl Args {
    /// Defaults, overridden by `--params` when given
    pub fn load_params(&self) -> Result<VisualizerParams> {
        match &self.params {
            Some(path) => VisualizerParams::from_json_file(path),
            None => Ok(VisualizerParams::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let args = Args::parse_from([
            "hapticwave",
            "render",
            "track.wav",
            "--seconds",
            "2.5",
            "--mode",
            "swarm",
            "--loop",
        ]);
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.mode, VisualizationMode::Swarm);
        assert_eq!(render.seconds, Some(2.5));
        assert!(render.looping);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_ticks_conflict_with_seconds() {
        let result = Args::try_parse_from([
            "hapticwave",
            "render",
            "track.wav",
            "--ticks",
            "10",
            "--seconds",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_catalog_list_filter() {
        let args = Args::parse_from([
            "hapticwave",
            "catalog",
            "list",
            "meta.json",
            "--search",
            "kick",
            "--min-balance",
            "-0.5",
            "--sort",
            "rms",
            "--desc",
        ]);
        let Command::Catalog(CatalogCommand::List(list)) = args.command else {
            panic!("expected catalog list");
        };
        let filter = list.filter();
        assert_eq!(filter.search.as_deref(), Some("kick"));
        assert_eq!(filter.balance.min, Some(-0.5));
        assert_eq!(list.sort, SortKey::Rms);
        assert!(list.desc);
    }

    #[test]
    fn test_scan_requires_files() {
        assert!(Args::try_parse_from(["hapticwave", "catalog", "scan", "meta.json"]).is_err());
    }

    #[test]
    fn test_default_params_without_file() {
        let args = Args::parse_from(["hapticwave", "catalog", "list", "meta.json"]);
        assert!(args.load_params().unwrap().validate().is_ok());
    }
}
