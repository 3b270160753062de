//! # Motion
//!
//! Ken Burns style pan/zoom over still images.
//!
//! Consecutive frames are grouped into short batches by [`MotionBatch`] so a
//! run of images shares one style and direction. Each clip gets an immutable
//! [`PosePath`] eased between a start and end [`Pose`]; rendering samples that
//! path at clip-local time.

pub mod batch;
pub mod clip;
pub mod ease;
pub mod generator;
pub mod plan;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReelError, Result};

pub use batch::{BatchPolicy, BatchSlot, Direction, MotionBatch, MotionStyle};
pub use clip::{KenBurnsClip, ZoomClip};
pub use ease::{ease_in_out, eased_progress, Pose, PosePath};
pub use generator::MotionGenerator;
pub use plan::{plan_cover, plan_fit, CoverPlan, FitPlan, WindowRect};

/// Per-clip motion requested for a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// Static frames
    #[default]
    None,
    /// Simple centre zoom of the composited frame
    Zoom,
    /// Batched pan/zoom over oversampled content
    KenBurns,
}

impl MotionMode {
    pub fn is_animated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for MotionMode {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "zoom" => Ok(Self::Zoom),
            "kenburns" | "ken-burns" | "ken_burns" => Ok(Self::KenBurns),
            other => Err(ReelError::invalid(
                "motion",
                format!("unknown value '{}', expected 'none', 'zoom' or 'kenburns'", other),
            )),
        }
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Zoom => "zoom",
            Self::KenBurns => "kenburns",
        })
    }
}
