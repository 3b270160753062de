use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::canvas::{cover_center, soft_blur, CanvasSize};
use crate::config::MotionConfig;
use crate::motion::batch::{BatchSlot, Direction};
use crate::motion::ease::{Pose, PosePath};
use crate::motion::plan::{plan_cover, plan_fit, WindowRect};
use crate::video::Frame;

/// Bilinear sample at continuous pixel coordinates, clamped to the image edges
fn sample_bilinear(src: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Draw `content` posed at `pose` into `region` of `dst`, masked to the region.
///
/// Every region pixel is written; coordinates outside the content clamp to its edge.
fn paint(dst: &mut RgbImage, region: WindowRect, content: &RgbImage, pose: Pose) {
    let scale = if pose.scale > 0.0 { pose.scale } else { 1.0 };
    for v in 0..region.height {
        let sy = (v as f64 + 0.5 - pose.y) / scale - 0.5;
        for u in 0..region.width {
            let sx = (u as f64 + 0.5 - pose.x) / scale - 0.5;
            dst.put_pixel(region.x + u, region.y + v, sample_bilinear(content, sx, sy));
        }
    }
}

#[derive(Debug, Clone)]
enum Layout {
    Cover,
    Fit { backdrop: RgbImage, window: WindowRect },
}

/// Animated pan/zoom over one source image
#[derive(Debug, Clone)]
pub struct KenBurnsClip {
    size: CanvasSize,
    content: RgbImage,
    layout: Layout,
    path: PosePath,
}

impl KenBurnsClip {
    /// Full-canvas motion over the oversampled cover layout
    pub fn cover(
        source: &RgbImage,
        size: CanvasSize,
        slot: BatchSlot,
        duration: f64,
        tuning: &MotionConfig,
    ) -> Self {
        let plan = plan_cover(source.dimensions(), size, slot, duration, tuning);
        let (w, h) = plan.content_size;
        Self {
            size,
            content: imageops::resize(source, w, h, FilterType::Lanczos3),
            layout: Layout::Cover,
            path: plan.path,
        }
    }

    /// Motion inside the fitted window over a static blurred copy of the source
    pub fn fit(
        source: &RgbImage,
        size: CanvasSize,
        slot: BatchSlot,
        duration: f64,
        tuning: &MotionConfig,
        backdrop_radius: f32,
    ) -> Self {
        let plan = plan_fit(source.dimensions(), size, slot, duration, tuning);
        let (w, h) = plan.content_size;
        let backdrop = soft_blur(&cover_center(source, size), backdrop_radius);
        Self {
            size,
            content: imageops::resize(source, w, h, FilterType::Lanczos3),
            layout: Layout::Fit {
                backdrop,
                window: plan.window,
            },
            path: plan.path,
        }
    }

    pub fn duration(&self) -> f64 {
        self.path.duration()
    }

    pub fn path(&self) -> &PosePath {
        &self.path
    }

    /// Fit-layout window, `None` for cover
    pub fn window(&self) -> Option<WindowRect> {
        match &self.layout {
            Layout::Cover => None,
            Layout::Fit { window, .. } => Some(*window),
        }
    }

    /// Render the canvas at clip-local time `t`
    pub fn render(&self, t: f64) -> Frame {
        let pose = self.path.sample(t);
        let image = match &self.layout {
            Layout::Cover => {
                let mut canvas = RgbImage::new(self.size.width, self.size.height);
                paint(&mut canvas, WindowRect::full(self.size), &self.content, pose);
                canvas
            }
            Layout::Fit { backdrop, window } => {
                let mut canvas = backdrop.clone();
                paint(&mut canvas, *window, &self.content, pose);
                canvas
            }
        };
        Frame::new(image)
    }
}

/// Simple zoom about the centre of an already composited frame
#[derive(Debug, Clone)]
pub struct ZoomClip {
    base: Frame,
    path: PosePath,
}

impl ZoomClip {
    pub fn new(base: Frame, slot: BatchSlot, duration: f64, strength: f64) -> Self {
        let (cx, cy) = (base.width() as f64 / 2.0, base.height() as f64 / 2.0);
        let (s0, s1) = match slot.direction {
            Direction::Forward => (1.0, 1.0 + strength),
            Direction::Reverse => (1.0 + strength, 1.0),
        };
        // keeps the centre fixed: position = c * (1 - s), linear in s
        let pose = |s: f64| Pose::new(s, cx * (1.0 - s), cy * (1.0 - s));
        Self {
            base,
            path: PosePath::new(pose(s0), pose(s1), duration),
        }
    }

    pub fn duration(&self) -> f64 {
        self.path.duration()
    }

    pub fn path(&self) -> &PosePath {
        &self.path
    }

    pub fn base(&self) -> &Frame {
        &self.base
    }

    pub fn render(&self, t: f64) -> Frame {
        let pose = self.path.sample(t);
        if pose == Pose::IDENTITY {
            return self.base.clone();
        }
        let (w, h) = self.base.dimensions();
        let mut canvas = RgbImage::new(w, h);
        paint(
            &mut canvas,
            WindowRect {
                x: 0,
                y: 0,
                width: w,
                height: h,
            },
            self.base.as_image(),
            pose,
        );
        Frame::new(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::batch::MotionStyle;

    const CANVAS: CanvasSize = CanvasSize { width: 90, height: 160 };

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 128])
        })
    }

    fn slot(style: MotionStyle, direction: Direction) -> BatchSlot {
        BatchSlot { style, direction }
    }

    #[test]
    fn test_cover_render_has_canvas_size() {
        let tuning = MotionConfig::default();
        let clip = KenBurnsClip::cover(
            &gradient(400, 300),
            CANVAS,
            slot(MotionStyle::Pan, Direction::Forward),
            2.0,
            &tuning,
        );
        for t in [0.0, 0.5, 1.0, 2.0] {
            assert_eq!(clip.render(t).dimensions(), (90, 160));
        }
        assert!(clip.window().is_none());
    }

    #[test]
    fn test_cover_pan_moves_content() {
        let tuning = MotionConfig::default();
        let clip = KenBurnsClip::cover(
            &gradient(400, 300),
            CANVAS,
            slot(MotionStyle::Pan, Direction::Forward),
            2.0,
            &tuning,
        );
        let first = clip.render(0.0);
        let last = clip.render(2.0);
        assert_ne!(first, last);
        // forward pan reveals content further right, so red grows
        assert!(last.get_pixel(45, 80)[0] > first.get_pixel(45, 80)[0]);
    }

    #[test]
    fn test_fit_render_keeps_backdrop_outside_window() {
        let tuning = MotionConfig::default();
        let source = RgbImage::from_pixel(400, 300, Rgb([250, 20, 20]));
        let clip = KenBurnsClip::fit(
            &source,
            CANVAS,
            slot(MotionStyle::Zoom, Direction::Forward),
            1.0,
            &tuning,
            3.0,
        );
        let window = clip.window().unwrap();
        assert_eq!((window.width, window.height), (90, 68));

        let start = clip.render(0.0);
        let end = clip.render(1.0);
        // letterbox rows come from the static backdrop in every frame
        assert_eq!(start.get_pixel(10, 2), end.get_pixel(10, 2));
        assert_eq!(start.get_pixel(45, 80), [250, 20, 20]);
    }

    #[test]
    fn test_render_matches_pose_boundaries() {
        let tuning = MotionConfig::default();
        let clip = KenBurnsClip::cover(
            &gradient(300, 300),
            CANVAS,
            slot(MotionStyle::Zoom, Direction::Reverse),
            1.5,
            &tuning,
        );
        assert_eq!(clip.path().sample(0.0).scale, tuning.zoom_scale);
        assert_eq!(clip.path().sample(1.5).scale, 1.0);
        assert_eq!(clip.render(1.5), clip.render(99.0));
    }

    #[test]
    fn test_zoom_clip_identity_at_start() {
        let base = Frame::new(gradient(90, 160));
        let clip = ZoomClip::new(
            base.clone(),
            slot(MotionStyle::Zoom, Direction::Forward),
            2.0,
            0.03,
        );
        assert_eq!(clip.render(0.0), base);
        let end = clip.render(2.0);
        assert_eq!(end.dimensions(), base.dimensions());
        assert_ne!(end, base);
    }

    #[test]
    fn test_zoom_clip_keeps_centre() {
        let base = Frame::new(gradient(90, 160));
        let clip = ZoomClip::new(
            base.clone(),
            slot(MotionStyle::Zoom, Direction::Reverse),
            1.0,
            0.03,
        );
        let start = clip.render(0.0);
        let centre = base.get_pixel(45, 80);
        let zoomed = start.get_pixel(45, 80);
        for c in 0..3 {
            assert!((centre[c] as i32 - zoomed[c] as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_sample_bilinear_interpolates() {
        let mut src = RgbImage::new(2, 1);
        src.put_pixel(0, 0, Rgb([0, 0, 0]));
        src.put_pixel(1, 0, Rgb([200, 100, 50]));
        assert_eq!(sample_bilinear(&src, 0.5, 0.0).0, [100, 50, 25]);
        assert_eq!(sample_bilinear(&src, -4.0, 3.0).0, [0, 0, 0]);
        assert_eq!(sample_bilinear(&src, 9.0, 0.0).0, [200, 100, 50]);
    }
}
