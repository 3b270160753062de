use std::borrow::Cow;
use tracing::debug;

use crate::audio::AudioData;
use crate::canvas::CanvasSize;
use crate::error::{ReelError, Result};
use crate::motion::{KenBurnsClip, ZoomClip};
use crate::video::Frame;

// start times within this tolerance of t count as already started
const TIME_EPSILON: f64 = 1e-9;

/// Raster content of one clip
#[derive(Debug, Clone)]
pub enum ClipContent {
    Still(Frame),
    Zoom(ZoomClip),
    KenBurns(KenBurnsClip),
}

impl ClipContent {
    /// Content at clip-local time `t`
    pub fn render(&self, t: f64) -> Cow<'_, Frame> {
        match self {
            Self::Still(frame) => Cow::Borrowed(frame),
            Self::Zoom(clip) => Cow::Owned(clip.render(t)),
            Self::KenBurns(clip) => Cow::Owned(clip.render(t)),
        }
    }
}

/// Entry transition: the clip fades in over the tail of the previous one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossFade {
    pub duration: f64,
}

/// One timed clip on the timeline
#[derive(Debug, Clone)]
pub struct Clip {
    /// 1-based source image index
    pub index: usize,
    pub duration: f64,
    /// Set by [`Timeline::assemble`]
    pub start: f64,
    pub content: ClipContent,
    pub entry: Option<CrossFade>,
}

impl Clip {
    pub fn new(index: usize, duration: f64, content: ClipContent) -> Self {
        Self {
            index,
            duration,
            start: 0.0,
            content,
            entry: None,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Ordered clips, overlapped by the cross-fade, plus fps and the fitted audio
#[derive(Debug, Clone)]
pub struct Timeline {
    clips: Vec<Clip>,
    fps: u32,
    size: CanvasSize,
    fade: f64,
    audio: Option<AudioData>,
}

impl Timeline {
    /// Concatenate clips with an overlap of `fade` seconds between neighbours.
    ///
    /// Every clip except the first gets a [`CrossFade`] entry when `fade > 0`.
    pub fn assemble(mut clips: Vec<Clip>, fade: f64, fps: u32, size: CanvasSize) -> Result<Self> {
        if clips.is_empty() {
            return Err(ReelError::NoInputImages);
        }
        if fps == 0 {
            return Err(ReelError::invalid("fps", "must be positive"));
        }

        let fade = if fade > 0.0 { fade } else { 0.0 };
        if let Some(short) = clips.iter().find(|clip| !(clip.duration > fade)) {
            return Err(ReelError::invalid(
                "transitions",
                format!(
                    "cross-fade of {:.3}s does not fit clip {} lasting {:.3}s",
                    fade, short.index, short.duration
                ),
            ));
        }

        let mut cursor = 0.0;
        for (i, clip) in clips.iter_mut().enumerate() {
            if i > 0 {
                // negative padding: each clip starts `fade` before the previous one ends
                cursor -= fade;
                clip.entry = (fade > 0.0).then_some(CrossFade { duration: fade });
            }
            clip.start = cursor;
            cursor += clip.duration;

            let size_matches = match &clip.content {
                ClipContent::Still(frame) => frame.dimensions() == (size.width, size.height),
                _ => true,
            };
            if !size_matches {
                return Err(ReelError::invalid(
                    "size",
                    format!("clip {} does not match the {} canvas", clip.index, size),
                ));
            }
        }

        let timeline = Self {
            clips,
            fps,
            size,
            fade,
            audio: None,
        };
        debug!(
            "Timeline assembled: {} clips, fade {:.3}s, {:.3}s total",
            timeline.clips.len(),
            fade,
            timeline.duration()
        );
        Ok(timeline)
    }

    pub fn with_audio(mut self, audio: Option<AudioData>) -> Self {
        self.audio = audio;
        self
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Overlap between neighbouring clips, 0 without transitions
    pub fn fade(&self) -> f64 {
        self.fade
    }

    pub fn audio(&self) -> Option<&AudioData> {
        self.audio.as_ref()
    }

    /// `Σ durations − (n − 1) · fade`
    pub fn duration(&self) -> f64 {
        self.clips.last().map(Clip::end).unwrap_or(0.0)
    }

    /// `round(duration × fps)`
    pub fn frame_count(&self) -> u64 {
        (self.duration() * self.fps as f64).round() as u64
    }

    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 / self.fps as f64
    }

    /// Index of the clip on top at time `t`
    pub fn clip_at(&self, t: f64) -> usize {
        self.clips
            .partition_point(|clip| clip.start <= t + TIME_EPSILON)
            .saturating_sub(1)
    }

    /// Render output frame `index`.
    ///
    /// During a cross-fade the incoming clip is blended linearly over the
    /// outgoing one; otherwise the current clip is shown alone.
    pub fn render_frame(&self, index: u64) -> Frame {
        let t = self.frame_time(index);
        let k = self.clip_at(t);
        let clip = &self.clips[k];
        let local = (t - clip.start).clamp(0.0, clip.duration);
        let current = clip.content.render(local);

        match clip.entry {
            Some(CrossFade { duration }) if k > 0 && local < duration => {
                let previous = &self.clips[k - 1];
                let previous_local = (t - previous.start).clamp(0.0, previous.duration);
                let outgoing = previous.content.render(previous_local);
                outgoing.blend(&current, local / duration)
            }
            _ => current.into_owned(),
        }
    }
}
