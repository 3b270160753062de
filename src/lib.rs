//! # Vertical-Reel
//!
//! Assemble vertical (9:16) videos from still images, with optional pan/zoom
//! motion, cross-fade transitions and a soundtrack fitted to the final length.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use vertical_reel::{
//!     composition::{BuildRequest, CancelToken, ReelEngine},
//!     config::Config,
//!     motion::MotionMode,
//!     video::FfmpegEncoder,
//! };
//!
//! # fn main() -> vertical_reel::Result<()> {
//! let config = Config::default();
//! let images = vec![PathBuf::from("photos/")];
//! let mut request = BuildRequest::new(images, "output/video.mp4", &config);
//! request.total_duration = Some(15.0);
//! request.transitions = true;
//! request.motion = MotionMode::KenBurns;
//!
//! let mut encoder = FfmpegEncoder::new(&config.encoder);
//! let engine = ReelEngine::new(config);
//! let progress = |i, n| println!("{}/{}", i, n);
//! let output = engine.build(&request, &mut encoder, progress, &CancelToken::new())?;
//! println!("Saved {}", output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`timing`] - Per-image duration and cross-fade arithmetic
//! - [`canvas`] - Image collection, decoding and fit/cover compositing
//! - [`motion`] - Batched Ken Burns pan/zoom
//! - [`audio`] - Soundtrack decoding and trim/loop fitting
//! - [`composition`] - Request validation, timeline assembly and the build engine
//! - [`video`] - Frames and the ffmpeg encoder
//! - [`config`] - Configuration management

pub mod audio;
pub mod canvas;
pub mod composition;
pub mod config;
pub mod error;
pub mod motion;
pub mod timing;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{BuildRequest, CancelToken, ReelEngine, Timeline},
    config::Config,
    error::{ReelError, Result},
    video::{FfmpegEncoder, VideoSink},
};
