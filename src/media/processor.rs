//! ffmpeg-backed implementation of the media engine.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaCommand, MediaCommandBuilder, MediaEngineTrait};
use crate::config::EncodeConfig;
use crate::error::{Result, ZoomreelError};
use crate::timeline::ZoomClip;

/// The slice of ffprobe's `-of json` payload this pipeline reads.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Media engine backed by the ffmpeg and ffprobe binaries.
pub struct FfmpegEngine {
    command_builder: MediaCommandBuilder,
    encode: EncodeConfig,
}

impl FfmpegEngine {
    /// Create a new engine around the configured binaries
    pub fn new(encode: EncodeConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&encode.ffmpeg_path);

        Self {
            command_builder,
            encode,
        }
    }

    /// Run a command to completion, feeding its progress stream into a
    /// console bar and surfacing the encoder's diagnostics on failure.
    async fn execute(&self, command: MediaCommand) -> Result<()> {
        debug!(
            "Executing: {} {}",
            command.binary_path,
            command.args.join(" ")
        );

        let mut child = Command::new(&command.binary_path)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ZoomreelError::Media(format!("Failed to start {}: {}", command.binary_path, e))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ZoomreelError::Media("Encoder stdout was not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ZoomreelError::Media("Encoder stderr was not captured".to_string()))?;

        // Drain stderr concurrently so the encoder cannot stall on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buffer = String::new();
            let _ = stderr.read_to_string(&mut buffer).await;
            buffer
        });

        let bar = progress_bar(&command);
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.map_err(|e| {
            ZoomreelError::Media(format!("Failed to read encoder progress: {}", e))
        })? {
            if let Some(position_ms) = parse_progress_line(&line) {
                bar.set_position(position_ms);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ZoomreelError::Media(format!("Failed to wait for encoder: {}", e)))?;
        let diagnostics = stderr_task
            .await
            .unwrap_or_else(|_| String::from("<failed to read encoder diagnostics>"));

        if !status.success() {
            bar.abandon();
            return Err(ZoomreelError::Media(format!(
                "{} failed: {}",
                command.description,
                diagnostics.trim()
            )));
        }

        bar.finish();
        debug!("{} completed", command.description);
        Ok(())
    }
}

#[async_trait]
impl MediaEngineTrait for FfmpegEngine {
    fn check_availability(&self) -> Result<()> {
        let command = self.command_builder.version_check();
        let output = std::process::Command::new(&command.binary_path)
            .args(&command.args)
            .output()
            .map_err(|e| {
                ZoomreelError::Media(format!("{} is not available: {}", command.binary_path, e))
            })?;

        if !output.status.success() {
            return Err(ZoomreelError::Media(format!(
                "{} version check failed",
                command.binary_path
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(version_line) = stdout.lines().next() {
            info!("Encoder available: {}", version_line);
        }
        Ok(())
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.encode.ffprobe_path)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("json")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ZoomreelError::Probe(format!(
                    "Failed to run {}: {}",
                    self.encode.ffprobe_path, e
                ))
            })?;

        if !output.status.success() {
            let diagnostics = String::from_utf8_lossy(&output.stderr);
            return Err(ZoomreelError::Probe(format!(
                "Probe of {} failed: {}",
                path.display(),
                diagnostics.trim()
            )));
        }

        parse_probe_duration(&output.stdout, path)
    }

    async fn encode_batch(
        &self,
        clips: &[ZoomClip],
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        let command = self
            .command_builder
            .assemble_batch(clips, audio_path, output_path, &self.encode);
        self.execute(command).await
    }
}

/// Parse one `key=value` line of the encoder's progress stream, returning
/// the output position in milliseconds. ffmpeg reports `out_time_us` in
/// microseconds and emits a large negative sentinel before the first frame.
fn parse_progress_line(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    if key != "out_time_us" {
        return None;
    }
    let micros = value.trim().parse::<i64>().ok()?;
    Some(micros.max(0) as u64 / 1000)
}

fn parse_probe_duration(payload: &[u8], path: &Path) -> Result<f64> {
    let probe: ProbeOutput = serde_json::from_slice(payload)?;
    let duration = probe.format.and_then(|f| f.duration).ok_or_else(|| {
        ZoomreelError::Probe(format!("No duration reported for {}", path.display()))
    })?;
    duration.trim().parse::<f64>().map_err(|e| {
        ZoomreelError::Probe(format!(
            "Unparseable duration {:?} for {}: {}",
            duration,
            path.display(),
            e
        ))
    })
}

fn progress_bar(command: &MediaCommand) -> ProgressBar {
    let total_secs = match command.expected_duration {
        Some(secs) if secs > 0.0 => secs,
        _ => return ProgressBar::hidden(),
    };

    let bar = ProgressBar::new((total_secs * 1000.0) as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar.set_message(command.description.clone());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_progress_line_reports_milliseconds() {
        assert_eq!(parse_progress_line("out_time_us=1500000"), Some(1500));
    }

    #[test]
    fn test_parse_progress_line_clamps_startup_sentinel() {
        // Before the first frame ffmpeg reports a huge negative position.
        assert_eq!(
            parse_progress_line("out_time_us=-9223372036854775807"),
            Some(0)
        );
    }

    #[test]
    fn test_parse_progress_line_ignores_other_keys() {
        assert_eq!(parse_progress_line("frame=42"), None);
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("bad line"), None);
    }

    #[test]
    fn test_parse_probe_duration() {
        let payload = br#"{"format":{"duration":"20.025000"}}"#;
        let duration = parse_probe_duration(payload, &PathBuf::from("track.m4a")).unwrap();
        assert!((duration - 20.025).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_duration_missing_field() {
        let payload = br#"{"format":{}}"#;
        let result = parse_probe_duration(payload, &PathBuf::from("track.m4a"));
        assert!(matches!(result, Err(ZoomreelError::Probe(_))));
    }

    #[test]
    fn test_parse_probe_duration_malformed_payload() {
        let result = parse_probe_duration(b"not json", &PathBuf::from("track.m4a"));
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_bar_hidden_without_expected_duration() {
        let command = MediaCommand::new("ffmpeg", "Version check").arg("-version");
        assert!(progress_bar(&command).is_hidden());
    }

    #[test]
    fn test_progress_bar_scaled_to_milliseconds() {
        let command = MediaCommand::new("ffmpeg", "Batch assembly").expect_duration(20.0);
        assert_eq!(progress_bar(&command).length(), Some(20_000));
    }
}
