use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ZoomreelError};

// Default values, referenced by serde so partial config files fall back
// key by key instead of failing to parse.
fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_audio_path() -> PathBuf {
    PathBuf::from("audio.m4a")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_duration_secs() -> f64 {
    2.0
}

fn default_zoom_start() -> f64 {
    1.0
}

fn default_zoom_end() -> f64 {
    1.2
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_fps() -> u32 {
    30
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_threads() -> u32 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub clip: ClipConfig,
    #[serde(default)]
    pub encode: EncodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for still images
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    /// Shared audio track attached to every batch
    #[serde(default = "default_audio_path")]
    pub audio_path: PathBuf,
    /// Directory receiving the encoded batch files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Seconds each image stays on screen
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    /// Scale factor at the start of a clip
    #[serde(default = "default_zoom_start")]
    pub zoom_start: f64,
    /// Scale factor reached at the end of a clip
    #[serde(default = "default_zoom_end")]
    pub zoom_end: f64,
    /// Output frame width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Output frame height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// Path to the ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Path to the ffprobe binary
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    /// Images per output file; the last batch may be smaller
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Constant output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Video codec passed to -c:v
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    /// Audio codec passed to -c:a
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Encoder speed/quality preset
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Worker threads used inside the encoder
    #[serde(default = "default_threads")]
    pub threads: u32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            audio_path: default_audio_path(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            zoom_start: default_zoom_start(),
            zoom_end: default_zoom_end(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            batch_size: default_batch_size(),
            fps: default_fps(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            threads: default_threads(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZoomreelError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ZoomreelError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ZoomreelError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ZoomreelError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let config = Config::default();
        assert_eq!(config.paths.output_dir, PathBuf::from("output"));
        assert_eq!(config.clip.duration_secs, 2.0);
        assert_eq!(config.clip.zoom_start, 1.0);
        assert_eq!(config.clip.zoom_end, 1.2);
        assert_eq!(config.clip.width, 1920);
        assert_eq!(config.clip.height, 1080);
        assert_eq!(config.encode.batch_size, 10);
        assert_eq!(config.encode.fps, 30);
        assert_eq!(config.encode.video_codec, "libx264");
        assert_eq!(config.encode.audio_codec, "aac");
        assert_eq!(config.encode.preset, "medium");
        assert_eq!(config.encode.threads, 4);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [paths]
            image_dir = "shots"

            [encode]
            preset = "slow"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.paths.image_dir, PathBuf::from("shots"));
        assert_eq!(parsed.paths.audio_path, PathBuf::from("audio.m4a"));
        assert_eq!(parsed.encode.preset, "slow");
        assert_eq!(parsed.encode.batch_size, 10);
        assert_eq!(parsed.clip.duration_secs, 2.0);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.encode.batch_size = 5;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.encode.batch_size, 5);
        assert_eq!(loaded.clip.zoom_end, 1.2);
    }
}
