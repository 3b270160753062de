use thiserror::Error;

/// Main error type for the vertical-reel library
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Invalid parameter '{field}': {details}")]
    InvalidParameter { field: String, details: String },

    #[error("No input images")]
    NoInputImages,

    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image loading errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to load image {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Unsupported image format: {path}")]
    UnsupportedFormat { path: String },
}

/// Audio loading and fitting errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Encoder errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("ffmpeg not found (looked for '{binary}')")]
    FfmpegNotFound { binary: String },

    #[error("Failed to spawn ffmpeg: {reason}")]
    SpawnFailed { reason: String },

    #[error("Failed to stream frames to ffmpeg: {reason}")]
    PipeFailed { reason: String },

    #[error("Failed to write soundtrack {path}: {reason}")]
    AudioTrackFailed { path: String, reason: String },

    #[error("Video encoding failed: {reason}")]
    Failed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Coarse classification of a [`ReelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    NoInputImages,
    PathNotFound,
    ImageLoadError,
    AudioLoadError,
    EncodeError,
    Config,
    Cancelled,
    Io,
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Build an `InvalidParameter` error for the named field
    pub fn invalid<F: Into<String>, D: Into<String>>(field: F, details: D) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            details: details.into(),
        }
    }

    pub fn path_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Self::PathNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::NoInputImages => ErrorKind::NoInputImages,
            Self::PathNotFound { .. } => ErrorKind::PathNotFound,
            Self::Image(_) => ErrorKind::ImageLoadError,
            Self::Audio(_) => ErrorKind::AudioLoadError,
            Self::Encode(_) => ErrorKind::EncodeError,
            Self::Config(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Check if this error is recoverable by the caller (nothing is retried internally)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Encode(EncodeError::PipeFailed { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::NoInputImages => {
                "No input images were given. Pass image files or a folder with .jpg/.png files."
                    .to_string()
            }
            Self::Image(ImageError::LoadFailed { path, .. }) => {
                format!(
                    "Could not read image '{}'. It may be corrupt or in an unsupported format.",
                    path
                )
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!(
                    "Could not load audio file '{}'. Check that it is a supported format.",
                    path
                )
            }
            Self::Encode(EncodeError::FfmpegNotFound { binary }) => {
                format!(
                    "'{}' was not found. Install FFmpeg or set encoder.ffmpeg in the config.",
                    binary
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
