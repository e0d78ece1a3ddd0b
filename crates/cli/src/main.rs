use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timeline::{format_clock, format_precise, ClipSource, LayoutConfig, TimelineEngine};
use tracing::{info, warn};

mod script;
mod source;

use source::{JsonClipSource, MockClipSource};

#[derive(Parser)]
#[command(name = "clipline")]
#[command(about = "Clipline - headless timeline layout from matched clips")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a timeline from matched clips and print the layout
    Inspect {
        /// JSON array of matched clips
        #[arg(short, long)]
        clips: PathBuf,

        /// Layout configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fit the timeline into this many pixels
        #[arg(long)]
        viewport: Option<f64>,

        /// Print the layout snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay recorded host events against a seeded timeline
    Replay {
        /// JSON array of matched clips
        #[arg(short, long)]
        clips: PathBuf,

        /// JSON array of host events
        #[arg(short, long)]
        script: PathBuf,

        /// Layout configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the layout snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lay out generated mock clips
    Demo {
        /// Number of clips
        #[arg(long, default_value = "6")]
        count: usize,

        /// Random seed
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Print the layout snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default layout configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect {
            clips,
            config,
            viewport,
            json,
        } => inspect_command(clips, config, viewport, json),
        Commands::Replay {
            clips,
            script,
            config,
            json,
        } => replay_command(clips, script, config, json),
        Commands::Demo { count, seed, json } => demo_command(count, seed, json),
        Commands::Config => config_command(),
    }
}

fn inspect_command(
    clips_path: PathBuf,
    config_path: Option<PathBuf>,
    viewport: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut engine = TimelineEngine::new(load_config(config_path)?);
    let source = JsonClipSource::load(&clips_path)?;
    engine.seed_from(&source);

    if let Some(width) = viewport {
        engine.fit_to_view(width);
    }
    print_layout(&engine, json)
}

fn replay_command(
    clips_path: PathBuf,
    script_path: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut engine = TimelineEngine::new(load_config(config_path)?);
    let source = JsonClipSource::load(&clips_path)?;
    engine.seed_from(&source);

    let events = script::load_script(&script_path)?;
    info!("Replaying {} events from {:?}", events.len(), script_path);
    let report = script::replay(&mut engine, &events);
    if engine.drag_session().is_some() {
        warn!("Script ended with a gesture still active; committing it");
        engine.end_gesture();
    }
    info!(
        "Replay completed: {} applied, {} rejected",
        report.applied, report.rejected
    );
    print_layout(&engine, json)
}

fn demo_command(count: usize, seed: u64, json: bool) -> Result<()> {
    let source = MockClipSource::new(count, seed);
    let mut engine = TimelineEngine::default();
    engine.seed(&source.matched_clips());
    print_layout(&engine, json)
}

fn config_command() -> Result<()> {
    let config = LayoutConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::load(&path)
            .with_context(|| format!("loading layout config {}", path.display())),
        None => Ok(LayoutConfig::default()),
    }
}

fn print_layout(engine: &TimelineEngine, json: bool) -> Result<()> {
    let snapshot = engine.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Timeline {} at {:.2} px/s, playhead {}{}",
        format_precise(snapshot.total_duration),
        snapshot.zoom,
        format_precise(snapshot.playhead),
        if snapshot.playing { " (playing)" } else { "" }
    );
    for track in &snapshot.tracks {
        let mut tags = vec![track.category.to_string()];
        if track.flags.muted {
            tags.push("muted".to_string());
        }
        if track.flags.solo {
            tags.push("solo".to_string());
        }
        if track.flags.locked {
            tags.push("locked".to_string());
        }
        println!("{} [{}]", track.name, tags.join(", "));
        for placement in &track.placements {
            println!(
                "  {:<16} {:<24} {} -> {}  x={:.1} w={:.1}",
                placement.clip_id,
                placement.name,
                format_precise(placement.start),
                format_precise(placement.end),
                placement.x,
                placement.width
            );
        }
    }

    let labels: Vec<String> = engine
        .ruler()
        .iter()
        .map(|tick| format_clock(tick.time))
        .collect();
    println!("Ruler: {}", labels.join(" "));
    Ok(())
}
