//! Ken Burns pose construction.
//!
//! Pure geometry: given the source size, the canvas and a batch slot, work out
//! how large the oversampled content is and where its top-left corner travels.

use crate::canvas::{fit_dimensions, CanvasSize};
use crate::config::MotionConfig;
use crate::motion::batch::{BatchSlot, Direction, MotionStyle};
use crate::motion::ease::{Pose, PosePath};

/// Axis-aligned rectangle on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl WindowRect {
    pub fn full(size: CanvasSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }
}

/// Cover-layout motion: content fills the whole canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlan {
    pub content_size: (u32, u32),
    pub path: PosePath,
}

/// Fit-layout motion: content animates inside a fixed window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    pub window: WindowRect,
    pub content_size: (u32, u32),
    pub path: PosePath,
}

fn oversample(dims: (f64, f64), k: f64, floor: (u32, u32)) -> (u32, u32) {
    (
        (dims.0 * k).floor().max(floor.0 as f64) as u32,
        (dims.1 * k).floor().max(floor.1 as f64) as u32,
    )
}

fn zoom_scales(direction: Direction, zoom_scale: f64) -> (f64, f64) {
    match direction {
        Direction::Forward => (1.0, zoom_scale),
        Direction::Reverse => (zoom_scale, 1.0),
    }
}

/// Start and end of a pan of `distance` centered on `center`
fn pan_span(center: f64, distance: f64, direction: Direction) -> (f64, f64) {
    let (low, high) = (center - distance / 2.0, center + distance / 2.0);
    match direction {
        Direction::Forward => (low, high),
        Direction::Reverse => (high, low),
    }
}

/// Plan motion for the cover layout.
///
/// The source is scaled `cover_overscan` beyond the cover fill so it can move
/// without exposing the canvas. Pans run along whichever axis has more slack.
pub fn plan_cover(
    source: (u32, u32),
    canvas: CanvasSize,
    slot: BatchSlot,
    duration: f64,
    tuning: &MotionConfig,
) -> CoverPlan {
    let (iw, ih) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (cw, ch) = (canvas.width as f64, canvas.height as f64);

    let k = (cw / iw).max(ch / ih) * (1.0 + tuning.cover_overscan);
    let content_size = oversample((iw, ih), k, (canvas.width, canvas.height));

    let max_dx = (content_size.0 - canvas.width) as f64;
    let max_dy = (content_size.1 - canvas.height) as f64;
    let (cx, cy) = (max_dx / 2.0, max_dy / 2.0);

    // offsets of the visible window into the content; pose is their negation
    let (start, end) = match slot.style {
        MotionStyle::Zoom => {
            let (s0, s1) = zoom_scales(slot.direction, tuning.zoom_scale);
            (Pose::new(s0, -cx, -cy), Pose::new(s1, -cx, -cy))
        }
        MotionStyle::Pan => {
            let s = tuning.pan_scale;
            if max_dx > max_dy {
                let (x0, x1) = pan_span(cx, max_dx * tuning.cover_pan_travel, slot.direction);
                (Pose::new(s, -x0, -cy), Pose::new(s, -x1, -cy))
            } else {
                let (y0, y1) = pan_span(cy, max_dy * tuning.cover_pan_travel, slot.direction);
                (Pose::new(s, -cx, -y0), Pose::new(s, -cx, -y1))
            }
        }
    };

    CoverPlan {
        content_size,
        path: PosePath::new(start, end, duration),
    }
}

/// Plan motion for the fit layout.
///
/// The window is the fitted rectangle, centered on the canvas. Content is
/// oversampled by `fit_overscan` relative to the window and its position is
/// relative to the window's top-left corner.
pub fn plan_fit(
    source: (u32, u32),
    canvas: CanvasSize,
    slot: BatchSlot,
    duration: f64,
    tuning: &MotionConfig,
) -> FitPlan {
    let (fit_w, fit_h) = fit_dimensions(source, canvas);
    let window = WindowRect {
        x: (canvas.width - fit_w) / 2,
        y: (canvas.height - fit_h) / 2,
        width: fit_w,
        height: fit_h,
    };

    let content_size = oversample(
        (fit_w as f64, fit_h as f64),
        1.0 + tuning.fit_overscan,
        (fit_w, fit_h),
    );
    let max_dx = (content_size.0 - fit_w) as f64;
    let max_dy = (content_size.1 - fit_h) as f64;
    let (bx, by) = (-max_dx / 2.0, -max_dy / 2.0);

    let (start, end) = match slot.style {
        MotionStyle::Zoom => {
            let (s0, s1) = zoom_scales(slot.direction, tuning.zoom_scale);
            (Pose::new(s0, bx, by), Pose::new(s1, bx, by))
        }
        MotionStyle::Pan => {
            let wide = source.0.max(1) as f64 / source.1.max(1) as f64 > canvas.aspect();
            if wide {
                let (x0, x1) = pan_span(bx, max_dx * tuning.fit_pan_travel, slot.direction);
                (Pose::new(1.0, x0, by), Pose::new(1.0, x1, by))
            } else {
                let (y0, y1) = pan_span(by, max_dy * tuning.fit_pan_travel, slot.direction);
                (Pose::new(1.0, bx, y0), Pose::new(1.0, bx, y1))
            }
        }
    };

    FitPlan {
        window,
        content_size,
        path: PosePath::new(start, end, duration),
    }
}

/// Whether content of `content_size` at `pose` covers a `viewport` of the given size
pub fn covers_viewport(pose: Pose, content_size: (u32, u32), viewport: (u32, u32)) -> bool {
    let eps = 1e-9;
    let right = pose.x + pose.scale * content_size.0 as f64;
    let bottom = pose.y + pose.scale * content_size.1 as f64;
    pose.x <= eps
        && pose.y <= eps
        && right >= viewport.0 as f64 - eps
        && bottom >= viewport.1 as f64 - eps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Vec<BatchSlot> {
        let mut all = Vec::new();
        for style in [MotionStyle::Zoom, MotionStyle::Pan] {
            for direction in [Direction::Forward, Direction::Reverse] {
                all.push(BatchSlot { style, direction });
            }
        }
        all
    }

    const SOURCES: [(u32, u32); 5] = [
        (4000, 3000),
        (3000, 4000),
        (1080, 1920),
        (500, 2500),
        (640, 640),
    ];

    #[test]
    fn test_cover_plan_is_edge_safe() {
        let tuning = MotionConfig::default();
        let canvas = CanvasSize::default();
        for &source in &SOURCES {
            for slot in slots() {
                let plan = plan_cover(source, canvas, slot, 4.0, &tuning);
                assert!(
                    plan.content_size.0 >= canvas.width && plan.content_size.1 >= canvas.height
                );
                for step in 0..=40 {
                    let pose = plan.path.sample(step as f64 * 0.1);
                    assert!(
                        covers_viewport(pose, plan.content_size, (canvas.width, canvas.height)),
                        "{:?} {:?} at {:?}",
                        source,
                        slot,
                        pose
                    );
                }
            }
        }
    }

    #[test]
    fn test_fit_plan_is_edge_safe_inside_window() {
        let tuning = MotionConfig::default();
        let canvas = CanvasSize::default();
        for &source in &SOURCES {
            for slot in slots() {
                let plan = plan_fit(source, canvas, slot, 2.5, &tuning);
                let window = (plan.window.width, plan.window.height);
                assert!(plan.window.x + plan.window.width <= canvas.width);
                assert!(plan.window.y + plan.window.height <= canvas.height);
                for step in 0..=25 {
                    let pose = plan.path.sample(step as f64 * 0.1);
                    assert!(
                        covers_viewport(pose, plan.content_size, window),
                        "{:?} {:?}",
                        source,
                        slot
                    );
                }
            }
        }
    }

    #[test]
    fn test_cover_zoom_direction() {
        let tuning = MotionConfig::default();
        let zoom_in = BatchSlot {
            style: MotionStyle::Zoom,
            direction: Direction::Forward,
        };
        let plan = plan_cover((4000, 3000), CanvasSize::default(), zoom_in, 3.0, &tuning);
        assert_eq!(plan.path.start().scale, 1.0);
        assert_eq!(plan.path.end().scale, tuning.zoom_scale);

        let zoom_out = BatchSlot {
            direction: Direction::Reverse,
            ..zoom_in
        };
        let plan = plan_cover((4000, 3000), CanvasSize::default(), zoom_out, 3.0, &tuning);
        assert_eq!(plan.path.start().scale, tuning.zoom_scale);
        assert_eq!(plan.path.end().scale, 1.0);
    }

    #[test]
    fn test_cover_pan_uses_axis_with_more_slack() {
        let tuning = MotionConfig::default();
        let pan = BatchSlot {
            style: MotionStyle::Pan,
            direction: Direction::Forward,
        };

        // landscape into portrait: lots of horizontal slack
        let plan = plan_cover((4000, 3000), CanvasSize::default(), pan, 3.0, &tuning);
        assert_eq!(plan.path.start().y, plan.path.end().y);
        assert!(plan.path.end().x < plan.path.start().x);

        let max_dx = (plan.content_size.0 - 1080) as f64;
        let travel = plan.path.start().x - plan.path.end().x;
        assert!((travel - max_dx * tuning.cover_pan_travel).abs() < 1e-9);

        // very tall source: vertical slack wins
        let plan = plan_cover((500, 2500), CanvasSize::default(), pan, 3.0, &tuning);
        assert_eq!(plan.path.start().x, plan.path.end().x);
        assert_ne!(plan.path.start().y, plan.path.end().y);
    }

    #[test]
    fn test_fit_window_is_centered_fitted_rect() {
        let tuning = MotionConfig::default();
        let slot = BatchSlot {
            style: MotionStyle::Pan,
            direction: Direction::Reverse,
        };
        let plan = plan_fit((4000, 3000), CanvasSize::default(), slot, 3.0, &tuning);
        assert_eq!((plan.window.width, plan.window.height), (1080, 810));
        assert_eq!((plan.window.x, plan.window.y), (0, 555));

        // wide source pans horizontally, reversed direction moves right to left
        assert_eq!(plan.path.start().y, plan.path.end().y);
        assert!(plan.path.start().x > plan.path.end().x);
    }
}
