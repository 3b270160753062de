use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ReelError, Result};

/// Raw audio data with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,

    /// Original file path
    pub file_path: PathBuf,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioData {
    /// Build audio from interleaved samples, deriving the duration
    pub fn from_samples(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
        file_path: PathBuf,
        format: AudioFormat,
    ) -> Self {
        let channels = channels.max(1);
        let duration = if sample_rate == 0 {
            0.0
        } else {
            (samples.len() / channels as usize) as f64 / sample_rate as f64
        };
        Self {
            samples,
            sample_rate,
            channels,
            duration,
            file_path,
            format,
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Copy with new samples, same rate/channels/provenance
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self::from_samples(
            samples,
            self.sample_rate,
            self.channels,
            self.file_path.clone(),
            self.format.clone(),
        )
    }
}

/// Audio file format information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Codec name for compressed formats
    pub compression: Option<String>,
}

/// How a track is fitted to the video length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFitMode {
    /// Cut to the video length; shorter tracks stay short
    #[default]
    Trim,
    /// Repeat until the video length, then cut
    Loop,
}

impl FromStr for AudioFitMode {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trim" => Ok(Self::Trim),
            "loop" => Ok(Self::Loop),
            other => Err(ReelError::invalid(
                "audio_adjust",
                format!("unknown value '{}', expected 'trim' or 'loop'", other),
            )),
        }
    }
}

impl fmt::Display for AudioFitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trim => "trim",
            Self::Loop => "loop",
        })
    }
}
