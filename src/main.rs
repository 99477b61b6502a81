use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::LevelFilter;

use wparty::platform::PlatformCall;
use wparty::settings::{load_settings, save_settings, FileSettingsStore};
use wparty::{
    format_time, generate_stars, resolve, PlaybackController, PlaybackStrategyKind, PlayerConfig,
    RecordingPlatform, VideoQuality, VideoReference,
};

#[derive(Parser)]
#[command(name = "wparty")]
#[command(version)]
#[command(about = "Resolve watch-party video links and inspect playback decisions")]
struct Args {
    /// Log debug output (RUST_LOG takes precedence when set)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// JSON file standing in for the page's local storage
    #[arg(long, global = true, default_value = "wparty-settings.json")]
    settings_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one or more video links
    Classify {
        urls: Vec<String>,
        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a catalog entry (JSON) and report how it would be played
    Inspect { catalog: PathBuf },
    /// Format a position in seconds as a clock
    FormatTime { seconds: f64 },
    /// Render a 0-10 rating as five stars
    Stars { rating: f64 },
    /// Show or change the saved settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Set the preferred quality (auto, 1080p, 720p, 480p, 360p)
    Quality { quality: String },
    /// Set the default volume in percent
    Volume { percent: f64 },
}

fn init_logger(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("wparty", level)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.command {
        Command::Classify { urls, json } => classify_urls(&urls, json)?,
        Command::Inspect { catalog } => inspect(&catalog, &args.settings_file)?,
        Command::FormatTime { seconds } => println!("{}", format_time(seconds)),
        Command::Stars { rating } => println!("{}", generate_stars(rating)),
        Command::Settings { action } => {
            settings(action.unwrap_or(SettingsAction::Show), &args.settings_file)?
        }
    }
    Ok(())
}

fn classify_urls(urls: &[String], json: bool) -> Result<()> {
    for url in urls {
        let outcome = resolve(url);
        if json {
            let kind = outcome.as_ref().cloned().unwrap_or(PlaybackStrategyKind::Unplayable);
            let line = serde_json::json!({ "url": url, "strategy": kind });
            println!("{}", serde_json::to_string(&line)?);
            continue;
        }
        match outcome {
            Ok(PlaybackStrategyKind::EmbeddedExternal { provider, embed_id }) => {
                println!("{}\tembedded\t{}\t{}", url, provider, provider.embed_url(&embed_id))
            }
            Ok(kind) => println!("{}\t{}", url, kind.name()),
            Err(e) => println!("{}\tunplayable\t{}", url, e),
        }
    }
    Ok(())
}

fn inspect(catalog: &Path, settings_file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(catalog)
        .with_context(|| format!("failed to read {}", catalog.display()))?;
    let reference = VideoReference::from_catalog_json(&raw)
        .with_context(|| format!("{} is not a catalog entry", catalog.display()))?;

    let settings = load_settings(&FileSettingsStore::new(settings_file));
    let platform = Arc::new(RecordingPlatform::new());
    let config = PlayerConfig::from_settings(&settings);
    let mut player = PlaybackController::new(config, platform.clone())
        .context("saved settings produce an invalid player config")?;
    player.load(reference.clone());

    println!("{}", reference.display_title());
    if let Some(rating) = reference.rating {
        println!("  rating:   {} {}", generate_stars(rating), rating);
    }
    if !reference.genres.is_empty() {
        println!("  genres:   {}", reference.genres.join(", "));
    }
    if let Some(strategy) = player.active_strategy() {
        println!("  strategy: {}", strategy.name());
    }
    for call in platform.calls() {
        match call {
            PlatformCall::MountEmbed(target) => {
                println!("  embed:    {} ({} quality)", target.embed_url, target.quality)
            }
            PlatformCall::AttachMedia(url) => println!("  media:    {}", url),
            PlatformCall::ShowInfoCard(url) => println!("  card:     open {} externally", url),
            _ => {}
        }
    }
    let state = player.get_current_state();
    println!(
        "  state:    {} / volume {:.0}% / {}x",
        format_time(state.current_time_seconds),
        state.volume * 100.0,
        state.playback_rate
    );
    Ok(())
}

fn settings(action: SettingsAction, settings_file: &Path) -> Result<()> {
    let mut store = FileSettingsStore::new(settings_file);
    let mut current = load_settings(&store);

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&current)?);
            return Ok(());
        }
        SettingsAction::Quality { quality } => {
            current.video_quality = VideoQuality::from(quality);
        }
        SettingsAction::Volume { percent } => {
            anyhow::ensure!(
                percent.is_finite() && (0.0..=100.0).contains(&percent),
                "volume must be between 0 and 100"
            );
            current.default_volume = percent;
        }
    }

    save_settings(&mut store, &current)
        .with_context(|| format!("failed to write {}", store.path().display()))?;
    log::info!("settings saved to {}", store.path().display());
    Ok(())
}
