use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::MotionConfig;

/// Motion style shared by a batch of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStyle {
    Zoom,
    Pan,
}

/// Binary direction flag.
///
/// `Forward` is zoom in, left→right or top→bottom; `Reverse` is the opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Style and direction assigned to one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSlot {
    pub style: MotionStyle,
    pub direction: Direction,
}

/// Batch length range and style odds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchPolicy {
    pub min_len: u32,
    pub max_len: u32,
    pub zoom_probability: f64,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::from(&MotionConfig::default())
    }
}

impl From<&MotionConfig> for BatchPolicy {
    fn from(config: &MotionConfig) -> Self {
        Self {
            min_len: config.batch_min.max(1),
            max_len: config.batch_max.max(config.batch_min.max(1)),
            zoom_probability: config.zoom_probability.clamp(0.0, 1.0),
        }
    }
}

/// Groups consecutive frames into runs that share one motion style.
///
/// Owned by a single build; a fixed seed makes the sequence reproducible.
#[derive(Debug, Clone)]
pub struct MotionBatch {
    rng: SmallRng,
    policy: BatchPolicy,
    remaining: u32,
    slot: BatchSlot,
}

impl MotionBatch {
    pub fn seeded(seed: u64, policy: BatchPolicy) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed), policy)
    }

    pub fn from_entropy(policy: BatchPolicy) -> Self {
        Self::with_rng(SmallRng::from_entropy(), policy)
    }

    pub fn new(seed: Option<u64>, policy: BatchPolicy) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed, policy),
            None => Self::from_entropy(policy),
        }
    }

    fn with_rng(rng: SmallRng, policy: BatchPolicy) -> Self {
        Self {
            rng,
            policy,
            remaining: 0,
            slot: BatchSlot {
                style: MotionStyle::Zoom,
                direction: Direction::Forward,
            },
        }
    }

    /// Frames left in the current batch
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Slot for the next frame, starting a new batch when the current one ran out
    pub fn next_slot(&mut self) -> BatchSlot {
        if self.remaining == 0 {
            self.remaining = self.rng.gen_range(self.policy.min_len..=self.policy.max_len);

            let style = if self.rng.gen::<f64>() < self.policy.zoom_probability {
                MotionStyle::Zoom
            } else {
                MotionStyle::Pan
            };
            let direction = if self.rng.gen_bool(0.5) {
                Direction::Reverse
            } else {
                Direction::Forward
            };
            self.slot = BatchSlot { style, direction };

            debug!(
                "New motion batch: {:?} {:?} for {} frames",
                style, direction, self.remaining
            );
        }

        self.remaining -= 1;
        self.slot
    }
}
