//! # Video Module
//!
//! Raster frames and the encoder collaborator that turns a timeline into a file.

pub mod encoder;
pub mod types;

pub use encoder::{ensure_parent_dir, ffmpeg_available, FfmpegEncoder, VideoSink};
pub use types::{EncodedVideo, Frame};
