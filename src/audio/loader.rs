use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::audio::types::{AudioData, AudioFormat};
use crate::error::{AudioError, Result};

/// Extensions decoded by [`AudioLoader::load`]
pub const AUDIO_EXTENSIONS: [&str; 6] = ["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// Audio file loader supporting multiple formats
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return raw audio data
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();
        let extension = Self::detect_format(path).unwrap_or_default();

        let audio = match extension.as_str() {
            "wav" => Self::load_wav(path)?,
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => Self::load_with_symphonia(path)?,
            _ => return Err(AudioError::UnsupportedFormat { format: extension }.into()),
        };

        info!(
            "Loaded audio {}: {:.2}s, {} Hz, {} ch",
            path.display(),
            audio.duration,
            audio.sample_rate,
            audio.channels
        );
        Ok(audio)
    }

    /// Load WAV files using the hound crate
    fn load_wav(path: &Path) -> Result<AudioData> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string(),
        };

        let reader = hound::WavReader::open(path).map_err(|_| load_failed())?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| load_failed())?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| Self::int_to_float(s, bit_depth)))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| load_failed())?
            }
        };

        Ok(AudioData::from_samples(
            samples,
            spec.sample_rate,
            spec.channels,
            path.to_path_buf(),
            AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        ))
    }

    /// Load compressed formats using Symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioData> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string(),
        };

        let file = File::open(path).map_err(|_| load_failed())?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| load_failed())?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(load_failed)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let mut sample_rate = codec_params.sample_rate;
        let mut channels = codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|_| load_failed())?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // end of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!("Skipping undecodable packet in {}: {}", path.display(), e);
                    continue;
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(_) => break,
            }
        }

        let sample_rate = sample_rate.ok_or_else(|| AudioError::InvalidParameters {
            details: "No sample rate found".to_string(),
        })?;
        let channels = channels.ok_or_else(|| AudioError::InvalidParameters {
            details: "No channel information found".to_string(),
        })?;

        Ok(AudioData::from_samples(
            samples,
            sample_rate,
            channels,
            path.to_path_buf(),
            AudioFormat {
                extension: Self::detect_format(path).unwrap_or_else(|| "unknown".to_string()),
                bit_depth: codec_params.bits_per_sample.map(|b| b as u16),
                compression: Some(format!("{:?}", codec_params.codec)),
            },
        ))
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => (sample as f32 - 128.0) / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0,
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        AUDIO_EXTENSIONS.contains(&extension.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_tone(path: &Path, seconds: f64, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * 8000.0) as usize;
        for i in 0..frames {
            let v = ((i as f32 * 0.05).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(v).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioLoader::detect_format("test.wav"), Some("wav".to_string()));
        assert_eq!(AudioLoader::detect_format("test.MP3"), Some("mp3".to_string()));
        assert_eq!(AudioLoader::detect_format("test"), None);
    }

    #[test]
    fn test_format_support() {
        assert!(AudioLoader::is_format_supported("wav"));
        assert!(AudioLoader::is_format_supported("mp3"));
        assert!(AudioLoader::is_format_supported("FLAC"));
        assert!(!AudioLoader::is_format_supported("xyz"));
    }

    #[test]
    fn test_int_to_float_conversion() {
        assert_eq!(AudioLoader::int_to_float(0, 16), 0.0);
        assert_eq!(AudioLoader::int_to_float(32767, 16), 32767.0 / 32768.0);
        assert_eq!(AudioLoader::int_to_float(-32768, 16), -1.0);

        assert_eq!(AudioLoader::int_to_float(128, 8), 0.0);
        assert_eq!(AudioLoader::int_to_float(0, 8), -1.0);
    }

    #[test]
    fn test_load_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 1.5, 2);

        let audio = AudioLoader::load(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frame_count(), 12000);
        assert!((audio.duration - 1.5).abs() < 1e-9);
        assert_eq!(audio.format.bit_depth, Some(16));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.xyz");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"dummy content").unwrap();

        match AudioLoader::load(&file_path) {
            Err(crate::error::ReelError::Audio(AudioError::UnsupportedFormat { format })) => {
                assert_eq!(format, "xyz")
            }
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_files_fail_to_load() {
        let dir = tempdir().unwrap();
        for name in ["broken.wav", "broken.mp3"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"definitely not audio").unwrap();
            let err = AudioLoader::load(&path).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::AudioLoadError, "{}", name);
        }
    }
}
