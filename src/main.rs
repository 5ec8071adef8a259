//! Zoomreel - Batch Zoom-Clip Video Assembler
//!
//! This is the main entry point for the zoomreel binary, which turns a
//! directory of still images into a set of slideshow videos with a slow
//! zoom on every image and a shared audio track, using ffmpeg.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zoomreel::assembler::Assembler;
use zoomreel::cli::Args;
use zoomreel::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting zoomreel batch assembly");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    apply_overrides(&mut config, &args);

    // Run the whole pipeline
    let assembler = Assembler::new(config)?;
    assembler.run().await?;

    info!("Batch assembly completed successfully");
    Ok(())
}

/// Fold command line overrides into the loaded configuration
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(images_dir) = &args.images_dir {
        config.paths.image_dir = images_dir.clone();
    }
    if let Some(audio) = &args.audio {
        config.paths.audio_path = audio.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.encode.batch_size = batch_size;
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".zoomreel").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "zoomreel.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console stays terse so the progress bars and path diagnostics are
    // readable; the file keeps locations for debugging.
    let console_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("zoomreel.log").display()
    );

    Ok(())
}
