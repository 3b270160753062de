use std::f64::consts::PI;

/// Sine ease-in-out on `[0, 1]`: `0.5 - 0.5 * cos(pi * x)`
pub fn ease_in_out(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    0.5 - 0.5 * (PI * x).cos()
}

/// Eased progress `α(t)` through a clip of `duration` seconds
pub fn eased_progress(t: f64, duration: f64) -> f64 {
    if !(duration > 0.0) {
        return 0.0;
    }
    ease_in_out(t / duration)
}

/// Camera pose: content scale and the content's top-left position in the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Pose {
    pub const IDENTITY: Pose = Pose { scale: 1.0, x: 0.0, y: 0.0 };

    pub fn new(scale: f64, x: f64, y: f64) -> Self {
        Self { scale, x, y }
    }

    pub fn lerp(&self, other: &Pose, a: f64) -> Pose {
        let mix = |from: f64, to: f64| from + (to - from) * a;
        Pose {
            scale: mix(self.scale, other.scale),
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
        }
    }
}

/// Immutable start→end pose interpolation over one clip.
///
/// `sample(t)` returns `start` exactly for `t <= 0` and `end` exactly for
/// `t >= duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosePath {
    start: Pose,
    end: Pose,
    duration: f64,
}

impl PosePath {
    pub fn new(start: Pose, end: Pose, duration: f64) -> Self {
        Self { start, end, duration }
    }

    pub fn fixed(pose: Pose, duration: f64) -> Self {
        Self::new(pose, pose, duration)
    }

    pub fn start(&self) -> Pose {
        self.start
    }

    pub fn end(&self) -> Pose {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn sample(&self, t: f64) -> Pose {
        if t <= 0.0 {
            return self.start;
        }
        if t >= self.duration {
            return self.end;
        }
        self.start.lerp(&self.end, eased_progress(t, self.duration))
    }
}
