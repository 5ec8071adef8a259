use std::path::Path;

use crate::config::EncodeConfig;
use crate::timeline::{batch_duration, ClipSpec, ZoomClip};

/// Abstract media processing command: the binary to run and the exact
/// argument list, built up front so it can be inspected without running
/// anything.
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    /// Seconds of output the command is expected to produce; lets the
    /// encoder scale its progress reporting.
    pub expected_duration: Option<f64>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            expected_duration: None,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file (must come last)
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite of an existing output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Suppress the banner and per-frame console spam
    pub fn quiet(self) -> Self {
        self.arg("-hide_banner").arg("-loglevel").arg("error").arg("-nostats")
    }

    /// Emit machine-readable progress on stdout
    pub fn progress_to_stdout(self) -> Self {
        self.arg("-progress").arg("pipe:1")
    }

    /// Set the composite filter graph
    pub fn filter_complex<S: Into<String>>(self, graph: S) -> Self {
        self.arg("-filter_complex").arg(graph)
    }

    /// Map a labelled stream into the output
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Set constant output frame rate
    pub fn frame_rate(self, fps: u32) -> Self {
        self.arg("-r").arg(fps.to_string())
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Set encoder speed/quality preset
    pub fn preset<S: Into<String>>(self, preset: S) -> Self {
        self.arg("-preset").arg(preset)
    }

    /// Set pixel format for player compatibility
    pub fn pixel_format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-pix_fmt").arg(format)
    }

    /// Bound the encoder's internal worker pool
    pub fn threads(self, count: u32) -> Self {
        self.arg("-threads").arg(count.to_string())
    }

    /// Cap the output duration in seconds
    pub fn duration_limit(self, secs: f64) -> Self {
        self.arg("-t").arg(format!("{:.6}", secs))
    }

    /// Move the MP4 index to the front for streaming-friendly files
    pub fn faststart(self) -> Self {
        self.arg("-movflags").arg("+faststart")
    }

    /// Record how many seconds of output this command should produce
    pub fn expect_duration(mut self, secs: f64) -> Self {
        self.expected_duration = Some(secs);
        self
    }
}

/// zoompan scale expression: a linear ramp from `zoom_start` to `zoom_end`
/// across the clip's output frames. `on` is the zero-based output frame, so
/// the ramp samples scale(t) at t = on / fps.
fn zoom_expr(spec: &ClipSpec, fps: u32) -> String {
    let frames = spec.frame_count(fps).max(1);
    format!(
        "{:.6}+{:.6}*on/{}",
        spec.zoom_start,
        spec.zoom_end - spec.zoom_start,
        frames
    )
}

/// Filter chain for one clip: fill the target frame (aspect preserved,
/// centered crop), then zoom in around the frame center.
fn clip_chain(input_index: usize, spec: &ClipSpec, fps: u32) -> String {
    let (w, h) = (spec.width, spec.height);
    format!(
        "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1,\
         zoompan=z='{z}':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d={d}:s={w}x{h}:fps={fps}[v{i}]",
        i = input_index,
        z = zoom_expr(spec, fps),
        d = spec.frame_count(fps).max(1),
    )
}

/// Audio chain: trim the shared track to the composite duration and pad
/// with silence when the source is shorter, so the slice always matches
/// the video exactly.
fn audio_chain(audio_index: usize, total_secs: f64) -> String {
    format!(
        "[{idx}:a]atrim=0:{total:.3},asetpts=PTS-STARTPTS,apad=whole_dur={total:.3}[aout]",
        idx = audio_index,
        total = total_secs,
    )
}

/// Complete filter graph for one batch: a zoom chain per image, a hard-cut
/// concat across them, and the trimmed audio slice. The audio input is
/// expected to follow the image inputs.
pub fn batch_filter_graph(clips: &[ZoomClip], fps: u32) -> String {
    let spec = clips[0].spec;
    let mut graph = String::new();

    for index in 0..clips.len() {
        graph.push_str(&clip_chain(index, &spec, fps));
        graph.push(';');
    }

    for index in 0..clips.len() {
        graph.push_str(&format!("[v{index}]"));
    }
    graph.push_str(&format!("concat=n={}:v=1:a=0[vout];", clips.len()));

    graph.push_str(&audio_chain(clips.len(), batch_duration(&spec, clips.len())));
    graph
}

/// Builder for the commands this pipeline issues
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }

    /// Build the complete single-invocation assembly for one batch: every
    /// image as an input, the shared audio last, the zoom/concat/trim filter
    /// graph, and the container/codec settings.
    pub fn assemble_batch(
        &self,
        clips: &[ZoomClip],
        audio_path: &Path,
        output_path: &Path,
        encode: &EncodeConfig,
    ) -> MediaCommand {
        debug_assert!(!clips.is_empty(), "a batch always holds at least one clip");
        let total_secs = batch_duration(&clips[0].spec, clips.len());

        let mut cmd = MediaCommand::new(
            &self.binary_path,
            format!("Batch assembly of {} clips", clips.len()),
        )
        .overwrite()
        .quiet()
        .progress_to_stdout();

        for clip in clips {
            cmd = cmd.input(&clip.image);
        }
        cmd = cmd.input(audio_path);

        cmd.filter_complex(batch_filter_graph(clips, encode.fps))
            .map("[vout]")
            .map("[aout]")
            .frame_rate(encode.fps)
            .video_codec(&encode.video_codec)
            .preset(&encode.preset)
            .pixel_format("yuv420p")
            .audio_codec(&encode.audio_codec)
            .threads(encode.threads)
            .duration_limit(total_secs)
            .faststart()
            .expect_duration(total_secs)
            .output(output_path)
    }
}
