//! # Composition Engine
//!
//! Validates a build request, turns each image into a timed clip, overlaps
//! neighbouring clips by the cross-fade and hands the finished timeline to a
//! [`VideoSink`](crate::video::VideoSink).

pub mod engine;
pub mod progress;
pub mod request;
pub mod timeline;

// Re-exports for convenience
pub use engine::ReelEngine;
pub use progress::{CancelToken, Progress};
pub use request::{BuildPlan, BuildRequest};
pub use timeline::{Clip, ClipContent, CrossFade, Timeline};
