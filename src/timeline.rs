//! Clip timing model: how long each image stays on screen and how far the
//! zoom has progressed at any instant. Everything here is pure math; the
//! filter expressions handed to the encoder are derived from these values.

use std::path::PathBuf;

use crate::config::ClipConfig;

/// Rendering parameters shared by every clip in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    /// Seconds each image stays on screen.
    pub duration_secs: f64,
    /// Scale factor at t = 0.
    pub zoom_start: f64,
    /// Scale factor reached at t = duration.
    pub zoom_end: f64,
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
}

impl ClipSpec {
    /// Scale factor at time `t` within a clip: linear from `zoom_start` at
    /// t = 0 to `zoom_end` at t = duration.
    pub fn scale_at(&self, t: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return self.zoom_start;
        }
        self.zoom_start + (self.zoom_end - self.zoom_start) * (t / self.duration_secs)
    }

    /// Number of output frames one clip contributes at the given frame rate.
    pub fn frame_count(&self, fps: u32) -> u64 {
        (self.duration_secs * f64::from(fps)).round() as u64
    }
}

impl From<&ClipConfig> for ClipSpec {
    fn from(config: &ClipConfig) -> Self {
        Self {
            duration_secs: config.duration_secs,
            zoom_start: config.zoom_start,
            zoom_end: config.zoom_end,
            width: config.width,
            height: config.height,
        }
    }
}

/// One still image scheduled to fill `spec.duration_secs` of a batch.
#[derive(Debug, Clone)]
pub struct ZoomClip {
    pub image: PathBuf,
    pub spec: ClipSpec,
}

impl ZoomClip {
    pub fn new<P: Into<PathBuf>>(image: P, spec: ClipSpec) -> Self {
        Self {
            image: image.into(),
            spec,
        }
    }

    /// Start offset of this clip when it is the `index`-th entry of a batch:
    /// the cumulative duration of its predecessors.
    pub fn start_offset(&self, index: usize) -> f64 {
        self.spec.duration_secs * index as f64
    }
}

/// Total duration of `len` clips laid out back to back with hard cuts.
pub fn batch_duration(spec: &ClipSpec, len: usize) -> f64 {
    spec.duration_secs * len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ClipSpec {
        ClipSpec::from(&ClipConfig::default())
    }

    #[test]
    fn test_scale_endpoints() {
        let spec = spec();
        assert_eq!(spec.scale_at(0.0), 1.0);
        assert!((spec.scale_at(2.0) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_scale_monotonically_increasing() {
        let spec = spec();
        let mut previous = spec.scale_at(0.0);
        for step in 1..=100 {
            let t = 2.0 * step as f64 / 100.0;
            let scale = spec.scale_at(t);
            assert!(scale > previous, "scale regressed at t={t}");
            previous = scale;
        }
    }

    #[test]
    fn test_scale_midpoint() {
        let spec = spec();
        assert!((spec.scale_at(1.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_duration_does_not_divide() {
        let spec = ClipSpec {
            duration_secs: 0.0,
            ..spec()
        };
        assert_eq!(spec.scale_at(0.0), 1.0);
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(spec().frame_count(30), 60);
        assert_eq!(spec().frame_count(24), 48);
    }

    #[test]
    fn test_batch_duration() {
        let spec = spec();
        for k in 1..=10usize {
            let expected = 2.0 * k as f64;
            assert!((batch_duration(&spec, k) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clip_start_offsets_accumulate() {
        let spec = spec();
        let clip = ZoomClip::new("a.jpg", spec);
        assert_eq!(clip.start_offset(0), 0.0);
        assert_eq!(clip.start_offset(4), 8.0);
    }
}
