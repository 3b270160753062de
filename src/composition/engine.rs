use std::path::PathBuf;
use tracing::{debug, info};

use crate::{
    audio::prepare_audio,
    canvas::{load_image, Compositor, FrameSpec},
    composition::progress::CancelToken,
    composition::request::{BuildPlan, BuildRequest},
    composition::timeline::{Clip, ClipContent, Timeline},
    config::Config,
    error::{ReelError, Result},
    motion::{BatchPolicy, MotionBatch, MotionGenerator, MotionMode},
    video::VideoSink,
};

/// Main engine that turns a list of images into a vertical video
///
/// The engine follows a clear pipeline:
/// 1. Validation - Check every parameter and resolve per-image timing
/// 2. Timeline - Composite (and optionally animate) each image in order
/// 3. Audio - Fit the soundtrack to the final timeline length
/// 4. Output - Hand the finished timeline to the video sink
pub struct ReelEngine {
    config: Config,
    compositor: Compositor,
    motion: MotionGenerator,
}

impl ReelEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        let compositor = Compositor::new(&config.background);
        let motion = MotionGenerator::new(&config.motion, &config.background);
        Self {
            config,
            compositor,
            motion,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the video described by `request` and return the output path.
    ///
    /// `progress` receives `(0, n)` before the first image, `(i, n)` after
    /// image `i` and `(n + 1, n)` right before encoding starts.
    pub fn build<S, F>(
        &self,
        request: &BuildRequest,
        sink: &mut S,
        mut progress: F,
        cancel: &CancelToken,
    ) -> Result<PathBuf>
    where
        S: VideoSink + ?Sized,
        F: FnMut(usize, usize),
    {
        info!("🎬 Starting vertical reel build");
        info!("   Output: {:?}", request.output);

        // Pipeline Step 1: Validation
        let plan = self.validate(request, sink)?;

        // Pipeline Step 2: Timeline
        let timeline = self.build_timeline(&plan, &mut progress, cancel)?;

        // Pipeline Step 3: Audio
        let timeline = self.attach_audio(&plan, timeline)?;

        // Pipeline Step 4: Output
        let n = plan.images.len();
        progress(n + 1, n);
        cancel.check()?;
        let encoded = sink.encode(&timeline, &plan.output, cancel)?;

        info!(
            "🎉 Build complete! {} frames, {:.2}s saved to: {:?}",
            encoded.frame_count, encoded.duration, encoded.path
        );
        Ok(encoded.path)
    }

    // ==========================================
    // PIPELINE STEP 1: VALIDATION
    // ==========================================

    fn validate<S: VideoSink + ?Sized>(
        &self,
        request: &BuildRequest,
        sink: &S,
    ) -> Result<BuildPlan> {
        info!("🔎 Step 1: Validating parameters...");
        let plan = request.validate(&self.config)?;
        sink.check(plan.size, plan.fps)?;

        info!("   ✅ {} images, {:.3}s each", plan.images.len(), plan.sec_per);
        if plan.fade > 0.0 {
            info!("      Cross-fade: {:.3}s", plan.fade);
        }
        info!("      Expected duration: {:.3}s", plan.expected_duration());
        Ok(plan)
    }

    // ==========================================
    // PIPELINE STEP 2: TIMELINE
    // ==========================================

    /// Composite every image of `plan` into a timeline, checking `cancel` before each one
    pub fn build_timeline<F: FnMut(usize, usize)>(
        &self,
        plan: &BuildPlan,
        progress: &mut F,
        cancel: &CancelToken,
    ) -> Result<Timeline> {
        info!(
            "🖼️  Step 2: Compositing {} images ({}, motion {})...",
            plan.images.len(),
            plan.fit_mode,
            plan.motion
        );

        let n = plan.images.len();
        progress(0, n);

        // build-local: never shared between builds
        let mut batch = MotionBatch::new(plan.seed, BatchPolicy::from(&self.config.motion));
        let mut clips = Vec::with_capacity(n);

        for position in 0..n {
            cancel.check()?;

            let spec = plan.frame_spec(position).ok_or(ReelError::NoInputImages)?;
            let content = self.clip_content(&spec, plan.motion, &mut batch)?;
            debug!("   Clip {:02}: {:?} {:.3}s", spec.index, spec.path, spec.duration);

            clips.push(Clip::new(spec.index, spec.duration, content));
            progress(position + 1, n);
        }

        let timeline = Timeline::assemble(clips, plan.fade, plan.fps, plan.size)?;

        info!("   ✅ Timeline assembled:");
        info!("      Clips: {}", timeline.clips().len());
        info!("      Duration: {:.3}s ({} frames)", timeline.duration(), timeline.frame_count());
        Ok(timeline)
    }

    fn clip_content(
        &self,
        spec: &FrameSpec,
        motion: MotionMode,
        batch: &mut MotionBatch,
    ) -> Result<ClipContent> {
        let source = load_image(&spec.path)?;

        let content = match motion {
            MotionMode::None => ClipContent::Still(self.compositor.compose(&source, spec)),
            MotionMode::Zoom => {
                let slot = batch.next_slot();
                let frame = self.compositor.compose(&source, spec);
                ClipContent::Zoom(self.motion.simple_zoom(frame, spec, slot))
            }
            MotionMode::KenBurns => {
                let slot = batch.next_slot();
                ClipContent::KenBurns(self.motion.ken_burns(&source, spec, slot))
            }
        };
        Ok(content)
    }

    // ==========================================
    // PIPELINE STEP 3: AUDIO
    // ==========================================

    /// Fit the soundtrack to the final concatenated duration
    fn attach_audio(&self, plan: &BuildPlan, timeline: Timeline) -> Result<Timeline> {
        let Some(path) = plan.audio.as_deref() else {
            return Ok(timeline);
        };

        info!("🎵 Step 3: Fitting audio to {:.3}s ({})...", timeline.duration(), plan.audio_fit);
        let audio = prepare_audio(Some(path), timeline.duration(), plan.audio_fit)?;
        Ok(timeline.with_audio(audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioData, AudioFitMode, AudioFormat};
    use crate::canvas::{CanvasSize, FitMode};
    use crate::error::ErrorKind;
    use crate::video::{EncodedVideo, Frame};
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Sink that renders every frame in memory instead of running ffmpeg
    #[derive(Default)]
    struct RecordingSink {
        encoded: bool,
        frame_count: u64,
        duration: f64,
        frames: Vec<Frame>,
        audio_frames: Option<usize>,
    }

    impl VideoSink for RecordingSink {
        fn check(&self, size: CanvasSize, _fps: u32) -> Result<()> {
            if size.width % 2 != 0 {
                return Err(ReelError::invalid("size", "odd width"));
            }
            Ok(())
        }

        fn encode(
            &mut self,
            timeline: &Timeline,
            output: &Path,
            cancel: &CancelToken,
        ) -> Result<EncodedVideo> {
            for index in 0..timeline.frame_count() {
                cancel.check()?;
                let frame = timeline.render_frame(index);
                assert_eq!(frame.dimensions(), (timeline.size().width, timeline.size().height));
                self.frames.push(frame);
            }
            self.encoded = true;
            self.frame_count = timeline.frame_count();
            self.duration = timeline.duration();
            self.audio_frames = timeline.audio().map(AudioData::frame_count);
            Ok(EncodedVideo {
                path: output.to_path_buf(),
                duration: self.duration,
                frame_count: self.frame_count,
                file_size: 0,
            })
        }
    }

    const SIZE: CanvasSize = CanvasSize { width: 36, height: 64 };

    fn write_images(count: usize) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let paths = (0..count)
            .map(|i| {
                let path = dir.path().join(format!("img_{:02}.png", i));
                RgbImage::from_fn(60, 40, |x, y| {
                    Rgb([(x * 4) as u8, (y * 6) as u8, (i * 60) as u8])
                })
                .save(&path)
                .unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn request(paths: Vec<PathBuf>, dir: &TempDir) -> BuildRequest {
        let mut request =
            BuildRequest::new(paths, dir.path().join("out/video.mp4"), &Config::default());
        request.size = SIZE;
        request
    }

    #[test]
    fn test_three_images_one_second_each() {
        let (dir, paths) = write_images(3);
        let mut req = request(paths, &dir);
        req.sec_per = 1.0;
        req.fps = 24;

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        let out = engine.build(&req, &mut sink, |_, _| {}, &CancelToken::new()).unwrap();

        assert_eq!(out, dir.path().join("out/video.mp4"));
        assert_eq!(sink.frame_count, 72);
        assert!((sink.duration - 3.0).abs() < 1e-9);
        assert_eq!(sink.frames.len(), 72);
        assert!(sink.audio_frames.is_none());
    }

    #[test]
    fn test_total_duration_with_transitions() {
        let (dir, paths) = write_images(3);
        let mut req = request(paths, &dir);
        req.total_duration = Some(10.0);
        req.transitions = true;
        req.fps = 30;

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        engine.build(&req, &mut sink, |_, _| {}, &CancelToken::new()).unwrap();

        assert!((sink.duration - 10.0).abs() < 1e-9);
        assert_eq!(sink.frame_count, 300);
    }

    #[test]
    fn test_progress_sequence() {
        let (dir, paths) = write_images(3);
        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        let mut calls = Vec::new();

        let mut req = request(paths, &dir);
        req.sec_per = 0.5;
        req.fps = 4;
        engine
            .build(&req, &mut sink, |i, n| calls.push((i, n)), &CancelToken::new())
            .unwrap();

        assert_eq!(calls, vec![(0, 3), (1, 3), (2, 3), (3, 3), (4, 3)]);
    }

    #[test]
    fn test_empty_input() {
        let dir = tempdir().unwrap();
        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        let err = engine
            .build(&request(Vec::new(), &dir), &mut sink, |_, _| {}, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoInputImages);
        assert!(!sink.encoded);
    }

    #[test]
    fn test_unknown_fit_mode() {
        let err = "weird".parse::<FitMode>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_corrupt_image_aborts_build() {
        let (dir, mut paths) = write_images(2);
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not a png at all").unwrap();
        paths.insert(1, broken);

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        let mut calls = Vec::new();
        let err = engine
            .build(&request(paths, &dir), &mut sink, |i, n| calls.push((i, n)), &CancelToken::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImageLoadError);
        assert_eq!(calls, vec![(0, 3), (1, 3)]);
        assert!(!sink.encoded);
    }

    #[test]
    fn test_sink_rejects_before_frame_work() {
        let (dir, paths) = write_images(2);
        let mut req = request(paths, &dir);
        req.size = CanvasSize::new(35, 64);

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        let mut calls = Vec::new();
        let err = engine
            .build(&req, &mut sink, |i, n| calls.push((i, n)), &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_cancellation() {
        let (dir, paths) = write_images(4);
        let engine = ReelEngine::new(Config::default());

        let cancelled = CancelToken::new();
        cancelled.cancel();
        let mut sink = RecordingSink::default();
        let err = engine
            .build(&request(paths.clone(), &dir), &mut sink, |_, _| {}, &cancelled)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);

        // cancelled from the progress callback after the second image
        let token = CancelToken::new();
        let handle = token.clone();
        let mut seen = Vec::new();
        let mut sink = RecordingSink::default();
        let err = engine
            .build(
                &request(paths, &dir),
                &mut sink,
                |i, n| {
                    seen.push(i);
                    if i == 2 {
                        handle.cancel();
                    }
                    let _ = n;
                },
                &token,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(!sink.encoded);
    }

    #[test]
    fn test_audio_fitted_to_final_duration() {
        let (dir, paths) = write_images(3);
        let track = dir.path().join("track.wav");
        AudioData::from_samples(
            vec![0.25; 8000],
            8000,
            1,
            track.clone(),
            AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(16),
                compression: None,
            },
        )
        .write_wav(&track)
        .unwrap();

        let mut req = request(paths, &dir);
        req.sec_per = 2.0;
        req.fps = 10;
        req.transitions = true;
        req.audio = Some(track);
        req.audio_fit = AudioFitMode::Loop;

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        engine.build(&req, &mut sink, |_, _| {}, &CancelToken::new()).unwrap();

        // fade = min(2.0 * 0.3, 0.7) = 0.6, so 6.0 - 2 * 0.6 = 4.8s
        assert!((sink.duration - 4.8).abs() < 1e-9);
        assert_eq!(sink.audio_frames, Some(38400));
    }

    #[test]
    fn test_ken_burns_is_deterministic_with_seed() {
        let (dir, paths) = write_images(5);
        let engine = ReelEngine::new(Config::default());

        let render = |fit_mode: FitMode| {
            let mut req = request(paths.clone(), &dir);
            req.sec_per = 0.5;
            req.fps = 8;
            req.motion = MotionMode::KenBurns;
            req.fit_mode = fit_mode;
            req.seed = Some(99);
            let mut sink = RecordingSink::default();
            engine.build(&req, &mut sink, |_, _| {}, &CancelToken::new()).unwrap();
            sink.frames
        };

        for fit_mode in [FitMode::Cover, FitMode::Fit] {
            let first = render(fit_mode);
            let second = render(fit_mode);
            assert_eq!(first.len(), 20);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_simple_zoom_motion() {
        let (dir, paths) = write_images(2);
        let mut req = request(paths, &dir);
        req.sec_per = 1.0;
        req.fps = 6;
        req.motion = MotionMode::Zoom;

        let engine = ReelEngine::new(Config::default());
        let mut sink = RecordingSink::default();
        engine.build(&req, &mut sink, |_, _| {}, &CancelToken::new()).unwrap();
        assert_eq!(sink.frames.len(), 12);
    }
}
