//! hapticwave - audio-reactive stereo visualizer core
//!
//! `render` steps a track on the tick clock and emits render frames,
//! `play` drives the same loop from live playback, `catalog` manages
//! pattern metadata.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hapticwave::catalog::Catalog;
use hapticwave::cli::{Args, CatalogCommand, Command, ListArgs, PlayArgs, RenderArgs};
use hapticwave::logging;
use hapticwave::params::VisualizerParams;
use hapticwave::session::Session;
use hapticwave::AudioSource;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let params = args.load_params().context("Failed to load parameters")?;

    match args.command {
        Command::Render(render) => run_render(params, render),
        Command::Play(play) => run_play(params, play),
        Command::Catalog(catalog) => run_catalog(catalog),
    }
}

/// Offline run: the session clock advances one tick of samples per tick
fn run_render(params: VisualizerParams, args: RenderArgs) -> Result<()> {
    let mut session = Session::offline(params)?;
    session.set_mode(args.mode);
    session.set_loop(args.looping);
    session.set_autoplay(true);
    session.load(&args.wav);
    session
        .wait_for_track()
        .with_context(|| format!("Failed to load {}", args.wav.display()))?;
    session.set_volume(args.volume);

    let render = &session.params().render;
    let ticks = match (args.ticks, args.seconds) {
        (Some(ticks), _) => ticks,
        (None, Some(seconds)) => render.ticks_for(seconds),
        (None, None) => {
            let duration = session.source().map_or(0.0, |s| s.duration_seconds());
            render.ticks_for(duration)
        }
    };

    if args.spectrogram.is_some() {
        session.capture_spectrogram(ticks as usize);
    }

    let mut dump = match &args.dump {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => None,
    };

    info!(ticks, mode = ?args.mode, "rendering");
    let mut active = 0u64;
    let mut entities = 0usize;
    for _ in 0..ticks {
        let frame = session.tick();
        if !frame.is_idle() {
            active += 1;
            entities = entities.max(frame.entity_count());
        }
        if let Some(out) = dump.as_mut() {
            serde_json::to_writer(&mut *out, &frame)?;
            out.write_all(b"\n")?;
        }
    }
    if let Some(mut out) = dump {
        out.flush()?;
    }

    if let (Some(path), Some(capture)) = (&args.spectrogram, session.spectrogram_capture()) {
        capture
            .export_png(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    println!("Rendered {ticks} ticks ({active} active, peak {entities} entities)");
    Ok(())
}

#[cfg(feature = "playback")]
fn run_play(params: VisualizerParams, args: PlayArgs) -> Result<()> {
    use std::time::{Duration, Instant};

    let tick_rate = params.render.tick_rate_hz.max(1);
    let mut session = Session::live(params)?;
    session.set_mode(args.mode);
    session.set_loop(args.looping);
    session.set_autoplay(true);
    session.load(&args.wav);
    session
        .wait_for_track()
        .with_context(|| format!("Failed to load {}", args.wav.display()))?;
    session.set_volume(args.volume);

    let period = Duration::from_secs_f64(1.0 / tick_rate as f64);
    let limit = args.seconds.map(|s| Duration::from_secs_f32(s.max(0.0)));
    let start = Instant::now();
    let mut next = start;

    println!("Playing {} (Ctrl-C to quit)", args.wav.display());
    loop {
        let frame = session.tick();
        if frame.frame_index % tick_rate as u64 == 0 && !frame.is_idle() {
            if let Some(features) = session.last_features() {
                info!(
                    frame = frame.frame_index,
                    overall = features.overall_intensity,
                    left = features.left.intensity,
                    right = features.right.intensity,
                    entities = frame.entity_count(),
                    "playing"
                );
            }
        }

        let playing = session.source().is_some_and(|s| s.is_playing());
        if !playing || limit.is_some_and(|l| start.elapsed() >= l) {
            break;
        }

        next += period;
        if let Some(wait) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    session.stop();
    info!(elapsed_s = start.elapsed().as_secs_f32(), "playback finished");
    Ok(())
}

#[cfg(not(feature = "playback"))]
fn run_play(_params: VisualizerParams, _args: PlayArgs) -> Result<()> {
    anyhow::bail!("built without live playback; rebuild with `--features playback`")
}

fn run_catalog(command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Scan {
            metadata,
            files,
            all,
        } => {
            let mut catalog = Catalog::load(&metadata)
                .with_context(|| format!("Failed to read {}", metadata.display()))?;
            let report = catalog.scan(&files, all);
            info!(
                processed = report.processed,
                skipped = report.skipped,
                errors = report.errors,
                "scan complete"
            );
            if report.processed > 0 {
                catalog.save(&metadata)?;
            }
            println!(
                "{} analysed, {} skipped, {} failed",
                report.processed, report.skipped, report.errors
            );
            Ok(())
        }
        CatalogCommand::List(list) => run_list(&list),
    }
}

fn run_list(args: &ListArgs) -> Result<()> {
    let catalog = Catalog::load(&args.metadata)
        .with_context(|| format!("Failed to read {}", args.metadata.display()))?;
    let hits = catalog.query(&args.filter(), args.sort, args.desc);

    println!(
        "{:<40} {:>8} {:>9} {:>8} {:>8}",
        "filename", "rms", "duration", "balance", "movement"
    );
    for p in &hits {
        println!(
            "{:<40} {:>8.4} {:>8.2}s {:>8.3} {:>8.3}",
            p.filename, p.rms_mean, p.duration, p.stereo_balance, p.stereo_movement
        );
    }
    println!("{} of {} patterns", hits.len(), catalog.patterns.len());
    Ok(())
}
