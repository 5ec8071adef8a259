use clap::Parser;
use std::path::PathBuf;

/// Batch zoom-clip video assembler.
///
/// Scans an image directory, groups the images into fixed-size batches and
/// renders one MP4 per batch, each clip slowly zooming into its image and
/// the whole batch backed by a slice of a shared audio track. Every argument
/// is optional; with no arguments the defaults (or a `config.toml` in the
/// working directory) are used.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory containing the source images (.jpg/.jpeg/.png)
    #[arg(short, long)]
    pub images_dir: Option<PathBuf>,

    /// Shared audio track attached to every batch
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Directory receiving the encoded output_<N>.mp4 files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Images per output file
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}
