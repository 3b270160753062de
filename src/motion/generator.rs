use image::RgbImage;
use tracing::debug;

use crate::canvas::{FitMode, FrameSpec};
use crate::config::{BackgroundConfig, MotionConfig};
use crate::motion::batch::BatchSlot;
use crate::motion::clip::{KenBurnsClip, ZoomClip};
use crate::video::Frame;

/// Builds motion clips for frame specs using the configured tuning
#[derive(Debug, Clone)]
pub struct MotionGenerator {
    tuning: MotionConfig,
    backdrop_radius: f32,
}

impl Default for MotionGenerator {
    fn default() -> Self {
        Self::new(&MotionConfig::default(), &BackgroundConfig::default())
    }
}

impl MotionGenerator {
    pub fn new(tuning: &MotionConfig, background: &BackgroundConfig) -> Self {
        Self {
            tuning: tuning.clone(),
            backdrop_radius: background.motion_blur_radius,
        }
    }

    /// Ken Burns clip over `source` in the layout named by `spec`.
    ///
    /// Crop offsets are not used: the motion path decides what is visible.
    pub fn ken_burns(&self, source: &RgbImage, spec: &FrameSpec, slot: BatchSlot) -> KenBurnsClip {
        debug!(
            "Ken Burns for frame {}: {:?} {:?} ({})",
            spec.index, slot.style, slot.direction, spec.fit_mode
        );
        match spec.fit_mode {
            FitMode::Cover => {
                KenBurnsClip::cover(source, spec.size, slot, spec.duration, &self.tuning)
            }
            FitMode::Fit => KenBurnsClip::fit(
                source,
                spec.size,
                slot,
                spec.duration,
                &self.tuning,
                self.backdrop_radius,
            ),
        }
    }

    /// Simple zoom over an already composited frame
    pub fn simple_zoom(&self, frame: Frame, spec: &FrameSpec, slot: BatchSlot) -> ZoomClip {
        debug!("Simple zoom for frame {}: {:?}", spec.index, slot.direction);
        ZoomClip::new(frame, slot, spec.duration, self.tuning.simple_zoom_strength)
    }
}
