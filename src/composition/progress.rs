use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ReelError, Result};

/// Where a build is, decoded from a `(current, total)` progress pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// `(0, n)`: about to process the first image
    Started,
    /// `(i, n)` with `1 <= i <= n`: image `i` has been added to the timeline
    Frame(usize),
    /// `(n + 1, n)`: all images done, encoding starts
    Encoding,
}

impl Progress {
    pub fn from_counts(current: usize, total: usize) -> Self {
        if current == 0 {
            Self::Started
        } else if current > total {
            Self::Encoding
        } else {
            Self::Frame(current)
        }
    }

    /// Fraction of the image loop completed, encoding counts as 1.0
    pub fn fraction(&self, total: usize) -> f64 {
        match self {
            Self::Started => 0.0,
            Self::Frame(i) if total > 0 => *i as f64 / total as f64,
            Self::Frame(_) | Self::Encoding => 1.0,
        }
    }
}

/// Cooperative cancellation flag shared between a build and its caller.
///
/// Checked once per frame while the timeline is assembled and while frames
/// are streamed to the encoder.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ReelError::Cancelled);
        }
        Ok(())
    }
}
