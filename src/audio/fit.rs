use std::path::Path;
use tracing::info;

use crate::audio::loader::AudioLoader;
use crate::audio::types::{AudioData, AudioFitMode};
use crate::error::{AudioError, EncodeError, ReelError, Result};

/// Fit `audio` to `target` seconds.
///
/// `Trim` keeps `min(source, target)`; `Loop` repeats the track and cuts it to
/// exactly `round(target * sample_rate)` sample frames.
pub fn fit_to_duration(audio: &AudioData, target: f64, mode: AudioFitMode) -> Result<AudioData> {
    if !(target > 0.0) || !target.is_finite() {
        return Err(AudioError::InvalidParameters {
            details: format!("target duration must be positive, got {}", target),
        }
        .into());
    }

    let channels = audio.channels.max(1) as usize;
    let source_frames = audio.frame_count();
    let target_frames = (target * audio.sample_rate as f64).round() as usize;

    let samples = match mode {
        AudioFitMode::Trim => {
            let frames = source_frames.min(target_frames);
            audio.samples[..frames * channels].to_vec()
        }
        AudioFitMode::Loop => {
            if source_frames == 0 {
                return Err(AudioError::InvalidParameters {
                    details: "cannot loop an empty audio track".to_string(),
                }
                .into());
            }
            let source = &audio.samples[..source_frames * channels];
            source.iter().copied().cycle().take(target_frames * channels).collect()
        }
    };

    Ok(audio.with_samples(samples))
}

/// Load and fit the optional audio track. `None` in, `None` out.
pub fn prepare_audio(
    path: Option<&Path>,
    target: f64,
    mode: AudioFitMode,
) -> Result<Option<AudioData>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        return Err(ReelError::path_not_found(path));
    }

    let audio = AudioLoader::load(path)?;
    let fitted = fit_to_duration(&audio, target, mode)?;
    info!(
        "Audio fitted ({}): {:.2}s -> {:.2}s",
        mode, audio.duration, fitted.duration
    );
    Ok(Some(fitted))
}

impl AudioData {
    /// Write the samples as 16-bit PCM WAV
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let spec = hound::WavSpec {
            channels: self.channels.max(1),
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let write_failed = |e: hound::Error| EncodeError::AudioTrackFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(write_failed)?;
        for &sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(value).map_err(write_failed)?;
        }
        writer.finalize().map_err(write_failed)?;
        Ok(())
    }
}
