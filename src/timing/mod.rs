//! # Timing
//!
//! Converts between "seconds per image" and "total video length" when
//! consecutive clips overlap by a cross-fade.
//!
//! The fade length follows `fade = min(sec_per * 0.3, 0.7)`, so there are two
//! regimes: a linear one below `0.7 / 0.3` seconds per image and a saturated
//! one above it. [`sec_per_for_total`] picks the right regime when solving
//! backwards.

pub mod duration;

pub use duration::{
    fade_for, sec_per_for_total, total_for, DurationSpec, FadeModel, FADE_MAX, FADE_RATIO,
    FADE_SWITCH,
};
