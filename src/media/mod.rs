// Media engine seam
//
// Every interaction with the external encoder goes through this module:
// - Processor: the ffmpeg/ffprobe implementation with progress streaming
// - Commands: command builders and the per-batch filter graph
//
// The trait keeps the batch pipeline testable without an encoder installed.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

#[cfg(test)]
use mockall::automock;

use crate::config::EncodeConfig;
use crate::error::Result;
use crate::timeline::ZoomClip;

/// Main trait for driving the external encoder
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaEngineTrait: Send + Sync {
    /// Verify the encoder binary is runnable, logging its version
    fn check_availability(&self) -> Result<()>;

    /// Duration of a media file in seconds, via the probe binary
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Encode one batch of zoom clips plus the shared audio track into a
    /// single output file
    async fn encode_batch(
        &self,
        clips: &[ZoomClip],
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()>;
}

/// Factory for creating media engine instances
pub struct MediaEngineFactory;

impl MediaEngineFactory {
    /// Create the default media engine implementation (FFmpeg-based)
    pub fn create_engine(encode: EncodeConfig) -> Box<dyn MediaEngineTrait> {
        Box::new(processor::FfmpegEngine::new(encode))
    }
}
