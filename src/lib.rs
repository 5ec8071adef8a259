//! Zoomreel - Batch Zoom-Clip Video Assembler
//!
//! A Rust implementation of a batch slideshow builder: every still image in
//! a directory becomes a short clip with a slow zoom, batches of clips are
//! concatenated into numbered videos and laid over a shared audio track,
//! all through ffmpeg.

pub mod cli;
pub mod config;
pub mod assembler;
pub mod discover;
pub mod timeline;
pub mod media;
pub mod error;
