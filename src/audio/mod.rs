//! # Audio Module
//!
//! Decodes the optional soundtrack and fits it to the final video length.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vertical_reel::audio::{prepare_audio, AudioFitMode};
//!
//! # fn main() -> vertical_reel::Result<()> {
//! let track = prepare_audio(Some(Path::new("song.mp3")), 12.5, AudioFitMode::Loop)?;
//! if let Some(track) = track {
//!     println!("{} sample frames", track.frame_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod fit;
pub mod loader;
pub mod types;

pub use fit::{fit_to_duration, prepare_audio};
pub use loader::{AudioLoader, AUDIO_EXTENSIONS};
pub use types::{AudioData, AudioFitMode, AudioFormat};
