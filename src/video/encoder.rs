use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::canvas::CanvasSize;
use crate::composition::{CancelToken, Timeline};
use crate::config::EncoderConfig;
use crate::error::{EncodeError, ReelError, Result};
use crate::video::types::EncodedVideo;

/// Destination for a finished timeline
pub trait VideoSink {
    /// Reject output settings the sink cannot produce. Called during validation.
    fn check(&self, size: CanvasSize, fps: u32) -> Result<()>;

    /// Render every timeline frame and write the video to `output`
    fn encode(
        &mut self,
        timeline: &Timeline,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<EncodedVideo>;
}

/// Whether `binary -version` runs successfully
pub fn ffmpeg_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn remove_partial_output(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => debug!("Removed partial output {}", output.display()),
        Err(e) => debug!("No partial output to remove: {}", e),
    }
}

/// Encodes through the system `ffmpeg`, streaming raw rgb24 frames over stdin
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder {
    config: EncoderConfig,
    temp_dir: Option<PathBuf>,
}

impl FfmpegEncoder {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            config: config.clone(),
            temp_dir: None,
        }
    }

    /// Keep the soundtrack WAV and the ffmpeg log in `dir` instead of the system temp dir
    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn is_available(&self) -> bool {
        ffmpeg_available(&self.config.ffmpeg)
    }

    /// Map 0-100 quality to x264 CRF (51 = worst, 0 = lossless)
    pub fn quality_to_crf(quality: u8) -> u8 {
        (51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }

    /// Command line for a `size` video at `fps`, with an optional WAV to mux
    pub fn build_args(
        &self,
        size: CanvasSize,
        fps: u32,
        audio: Option<&Path>,
        output: &Path,
    ) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(size.to_string());
        args.extend([
            "-r".to_string(),
            fps.to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
        ]);

        if let Some(audio) = audio {
            args.extend(["-i".to_string(), audio.display().to_string()]);
        }

        args.extend([
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            Self::quality_to_crf(self.config.quality).to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);

        if audio.is_some() {
            args.extend([
                "-c:a".to_string(),
                self.config.audio_codec.clone(),
                "-b:a".to_string(),
                self.config.audio_bitrate.clone(),
            ]);
        } else {
            args.push("-an".to_string());
        }

        args.extend(["-movflags".to_string(), "+faststart".to_string()]);
        args.push(output.display().to_string());
        args
    }

    fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn spawn(&self, args: &[String], stderr_log: &File) -> Result<Child> {
        debug!("Running {} {}", self.config.ffmpeg, args.join(" "));
        // stderr goes to a file so a chatty ffmpeg never blocks on a full pipe
        let stderr = stderr_log.try_clone()?;
        Command::new(&self.config.ffmpeg)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| {
                EncodeError::SpawnFailed {
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Stream every frame; the child is left for the caller to reap
    fn stream_frames(
        &self,
        child: &mut Child,
        timeline: &Timeline,
        cancel: &CancelToken,
    ) -> Result<u64> {
        let mut stdin = child.stdin.take().ok_or_else(|| EncodeError::PipeFailed {
            reason: "ffmpeg stdin unavailable".to_string(),
        })?;

        let total = timeline.frame_count();
        for index in 0..total {
            cancel.check()?;
            let frame = timeline.render_frame(index);
            stdin
                .write_all(frame.as_rgb_bytes())
                .map_err(|e| EncodeError::PipeFailed {
                    reason: format!("frame {}/{}: {}", index + 1, total, e),
                })?;
        }
        stdin
            .flush()
            .map_err(|e| EncodeError::PipeFailed { reason: e.to_string() })?;
        // dropping stdin closes the pipe so ffmpeg can finish
        Ok(total)
    }

    fn finish(mut child: Child, mut stderr_log: File) -> Result<()> {
        let status = child.wait().map_err(|e| EncodeError::Failed {
            reason: format!("failed to wait for ffmpeg: {}", e),
        })?;

        if !status.success() {
            let mut stderr = Vec::new();
            stderr_log.seek(SeekFrom::Start(0))?;
            stderr_log.read_to_end(&mut stderr)?;
            return Err(EncodeError::Failed {
                reason: format!(
                    "ffmpeg exited with {}: {}",
                    status,
                    String::from_utf8_lossy(&stderr).trim()
                ),
            }
            .into());
        }
        Ok(())
    }
}

impl VideoSink for FfmpegEncoder {
    fn check(&self, size: CanvasSize, fps: u32) -> Result<()> {
        if size.width % 2 != 0 || size.height % 2 != 0 {
            return Err(ReelError::invalid(
                "size",
                format!("{} must have even dimensions for yuv420p output", size),
            ));
        }
        if fps == 0 {
            return Err(ReelError::invalid("fps", "must be > 0"));
        }
        if !self.is_available() {
            return Err(EncodeError::FfmpegNotFound {
                binary: self.config.ffmpeg.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn encode(
        &mut self,
        timeline: &Timeline,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<EncodedVideo> {
        ensure_parent_dir(output)?;
        let scratch = self.scratch_dir();

        // both are removed when dropped, on every exit path
        let audio_file = match timeline.audio() {
            Some(audio) => {
                let file = tempfile::Builder::new()
                    .prefix("vertical-reel-")
                    .suffix(".wav")
                    .tempfile_in(&scratch)?;
                audio.write_wav(file.path())?;
                Some(file)
            }
            None => None,
        };
        let stderr_log = tempfile::tempfile_in(&scratch)?;

        let args = self.build_args(
            timeline.size(),
            timeline.fps(),
            audio_file.as_ref().map(|file| file.path()),
            output,
        );

        info!(
            "🎞️  Encoding {} frames ({:.2}s) to {}",
            timeline.frame_count(),
            timeline.duration(),
            output.display()
        );

        let mut child = self.spawn(&args, &stderr_log)?;
        let result = match self.stream_frames(&mut child, timeline, cancel) {
            Ok(count) => Self::finish(child, stderr_log).map(|()| count),
            Err(ReelError::Cancelled) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(ReelError::Cancelled)
            }
            Err(err) => {
                // a broken pipe usually means ffmpeg died; its stderr says why
                warn!("Streaming to ffmpeg failed: {}", err);
                Self::finish(child, stderr_log).and(Err(err))
            }
        };

        let streamed = match result {
            Ok(count) => count,
            Err(err) => {
                remove_partial_output(output);
                return Err(err);
            }
        };
        drop(audio_file);

        let file_size = std::fs::metadata(output)?.len();
        info!(
            "Video encoding complete: {:.1}MB",
            file_size as f64 / 1024.0 / 1024.0
        );

        Ok(EncodedVideo {
            path: output.to_path_buf(),
            duration: timeline.duration(),
            frame_count: streamed,
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioData, AudioFormat};
    use crate::composition::{Clip, ClipContent};
    use crate::error::ErrorKind;
    use crate::video::Frame;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Executable shell script standing in for ffmpeg
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn tiny_timeline(with_audio: bool) -> Timeline {
        let clips = vec![Clip::new(
            1,
            1.0,
            ClipContent::Still(Frame::new_filled(4, 6, [10, 20, 30])),
        )];
        let timeline = Timeline::assemble(clips, 0.0, 24, CanvasSize::new(4, 6)).unwrap();
        let audio = with_audio.then(|| {
            AudioData::from_samples(
                vec![0.25; 8000],
                8000,
                1,
                PathBuf::from("track.wav"),
                AudioFormat {
                    extension: "wav".to_string(),
                    bit_depth: Some(16),
                    compression: None,
                },
            )
        });
        timeline.with_audio(audio)
    }

    fn scratch_leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("vertical-reel-"))
            .collect()
    }

    fn scripted_encoder(script: String, scratch: &Path) -> FfmpegEncoder {
        FfmpegEncoder::new(&EncoderConfig {
            ffmpeg: script,
            ..EncoderConfig::default()
        })
        .with_temp_dir(scratch)
    }

    #[test]
    fn test_quality_to_crf() {
        assert_eq!(FfmpegEncoder::quality_to_crf(100), 0);
        assert_eq!(FfmpegEncoder::quality_to_crf(0), 51);
        assert_eq!(FfmpegEncoder::quality_to_crf(85), 8);
        assert_eq!(FfmpegEncoder::quality_to_crf(250), 0);
    }

    #[test]
    fn test_args_without_audio() {
        let encoder = FfmpegEncoder::default();
        let args = encoder.build_args(CanvasSize::default(), 30, None, Path::new("out/video.mp4"));

        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -s 1080x1920 -r 30 -i pipe:0"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(args.last().unwrap(), "out/video.mp4");
    }

    #[test]
    fn test_args_with_audio() {
        let encoder = FfmpegEncoder::new(&EncoderConfig {
            audio_bitrate: "128k".to_string(),
            ..EncoderConfig::default()
        });
        let wav = PathBuf::from("/tmp/track.wav");
        let args =
            encoder.build_args(CanvasSize::new(720, 1280), 24, Some(&wav), Path::new("v.mp4"));

        let joined = args.join(" ");
        assert!(joined.contains("-i pipe:0 -i /tmp/track.wav"));
        assert!(joined.contains("-c:a aac -b:a 128k"));
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let encoder = FfmpegEncoder::default();
        let err = encoder.check(CanvasSize::new(1081, 1920), 30).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_missing_binary_reported() {
        let encoder = FfmpegEncoder::new(&EncoderConfig {
            ffmpeg: "definitely-not-an-ffmpeg-binary".to_string(),
            ..EncoderConfig::default()
        });
        assert!(!encoder.is_available());
        let err = encoder.check(CanvasSize::default(), 30).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::EncodeError);
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/deeper/video.mp4");
        ensure_parent_dir(&output).unwrap();
        assert!(output.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("video.mp4")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_streams_every_frame() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        // consume the raw frames, then write a stand-in container to the last argument
        let script = fake_ffmpeg(
            dir.path(),
            "for last; do :; done\ncat > /dev/null\nprintf 'mp4!' > \"$last\"",
        );
        let output = dir.path().join("out/video.mp4");

        let mut encoder = scripted_encoder(script, &scratch);
        let video = encoder
            .encode(&tiny_timeline(true), &output, &CancelToken::new())
            .unwrap();

        assert_eq!(video.frame_count, 24);
        assert_eq!(video.file_size, 4);
        assert!((video.duration - 1.0).abs() < 1e-9);
        assert!(scratch_leftovers(&scratch).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_failure_carries_stderr_and_cleans_up() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let script = fake_ffmpeg(
            dir.path(),
            "echo 'Unknown encoder libx264-missing' >&2\nexit 1",
        );
        let output = dir.path().join("video.mp4");
        std::fs::write(&output, b"partial").unwrap();

        let mut encoder = scripted_encoder(script, &scratch);
        let err = encoder
            .encode(&tiny_timeline(true), &output, &CancelToken::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EncodeError);
        assert!(err.to_string().contains("Unknown encoder libx264-missing"));
        assert!(!output.exists());
        assert!(scratch_leftovers(&scratch).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_cancelled_removes_output() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let script = fake_ffmpeg(dir.path(), "cat > /dev/null");
        let output = dir.path().join("video.mp4");
        std::fs::write(&output, b"partial").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut encoder = scripted_encoder(script, &scratch);
        let err = encoder
            .encode(&tiny_timeline(true), &output, &cancel)
            .unwrap_err();

        assert!(matches!(err, ReelError::Cancelled));
        assert!(!output.exists());
        assert!(scratch_leftovers(&scratch).is_empty());
    }

    #[test]
    fn test_ffmpeg_available_for_missing_binary() {
        assert!(!ffmpeg_available("definitely-not-an-ffmpeg-binary"));
    }
}
