//! Letters CLI
//!
//! Play the per-character text animation presets in a terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use letters_animation::PresetKind;

mod config;
mod player;
mod probe;
mod render;

use config::LettersConfig;
use player::{Player, Script};
use probe::MonospaceProbe;

#[derive(Parser)]
#[command(name = "letters")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Staggered per-character text animations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file or directory containing letters.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available presets and their timing
    Presets,

    /// Play one preset
    Play {
        /// Preset name (fade, scale-in, scale-out, jump, rotate)
        preset: String,

        /// Text to animate
        #[arg(short, long)]
        text: Option<String>,

        /// Frames printed per second
        #[arg(long)]
        fps: Option<u32>,

        /// Pause after this many milliseconds
        #[arg(long)]
        pause_at: Option<u64>,

        /// Resume this many milliseconds after the pause
        #[arg(long, requires = "pause_at")]
        resume_after: Option<u64>,

        /// Stop after this many milliseconds
        #[arg(long)]
        stop_at: Option<u64>,
    },

    /// Play every preset one after another
    Showcase {
        /// Text to animate
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Write a starter letters.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Presets => cmd_presets(cli.config.as_deref()),

        Commands::Play {
            preset,
            text,
            fps,
            pause_at,
            resume_after,
            stop_at,
        } => {
            let script = Script {
                start_delay: Duration::ZERO,
                pause_at: pause_at.map(Duration::from_millis),
                resume_after: resume_after.map(Duration::from_millis),
                stop_at: stop_at.map(Duration::from_millis),
            };
            cmd_play(
                cli.config.as_deref(),
                &preset,
                text.as_deref(),
                fps,
                script,
            )
        }

        Commands::Showcase { text } => cmd_showcase(cli.config.as_deref(), text.as_deref()),

        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .context("Failed to start the async runtime")
}

fn cmd_presets(config_path: Option<&Path>) -> Result<()> {
    let config = LettersConfig::load(config_path)?;

    println!(
        "{:<10} {:>9} {:>9}  {}",
        "PRESET", "DURATION", "STAGGER", "EASING"
    );
    for kind in PresetKind::ALL {
        let preset = config.preset_config(kind);
        let easing = match preset.spring {
            Some(spring) => format!(
                "spring (damping {}, stiffness {})",
                spring.damping_ratio, spring.stiffness
            ),
            None => format!("{:?}", preset.easing),
        };
        println!(
            "{:<10} {:>7}ms {:>7}ms  {}",
            kind.name(),
            preset.animation_duration_ms,
            preset.intermediate_duration_ms,
            easing
        );
    }
    Ok(())
}

fn cmd_play(
    config_path: Option<&Path>,
    preset: &str,
    text: Option<&str>,
    fps: Option<u32>,
    script: Script,
) -> Result<()> {
    let config = LettersConfig::load(config_path)?;
    let kind: PresetKind = preset.parse()?;
    let text = text.unwrap_or(&config.demo.text);
    let probe = MonospaceProbe::new(config.demo.wrap_width);
    let fps = fps.unwrap_or(config.demo.fps);

    let stdout = io::stdout();
    let mut player = Player::new(&probe, fps, stdout.lock());
    let frame = runtime()?.block_on(player.play(text, kind, config.preset_config(kind), script))?;

    info!(
        settled = frame.settled_count(),
        status = %frame.status,
        "playback finished"
    );
    Ok(())
}

fn cmd_showcase(config_path: Option<&Path>, text: Option<&str>) -> Result<()> {
    let config = LettersConfig::load(config_path)?;
    let text = text.unwrap_or(&config.demo.text);
    let probe = MonospaceProbe::new(config.demo.wrap_width);
    let script = Script {
        start_delay: Duration::from_millis(config.demo.start_delay_ms),
        ..Script::default()
    };

    let rt = runtime()?;

    for kind in PresetKind::ALL {
        let mut out = io::stdout().lock();
        writeln!(out, "== {} ==", kind)?;
        let mut player = Player::new(&probe, config.demo.fps, out);
        rt.block_on(player.play(text, kind, config.preset_config(kind), script))?;
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    let written = LettersConfig::write_starter(path, force)?;
    info!("Created {}", written.display());
    println!("Wrote {}", written.display());
    Ok(())
}
