//! Audio decoder using symphonia
//!
//! Decodes a stored music file or an in-memory MP3 (speech synthesis output)
//! into an [`AudioClip`] in the working format. Mono is duplicated to stereo,
//! extra channels beyond the first two are dropped, and the result is
//! resampled to 44.1 kHz.

use crate::audio::resampler::Resampler;
use crate::error::{Error, Result};
use blaze_common::{AudioClip, CHANNELS};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Stateless symphonia front end
pub struct Decoder;

impl Decoder {
    /// Decode an entire file from disk
    pub fn decode_file(path: &Path) -> Result<AudioClip> {
        debug!("Decoding file: {}", path.display());

        let file = std::fs::File::open(path)
            .map_err(|e| Error::Decode(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        Self::decode_source(Box::new(file), hint)
    }

    /// Decode an in-memory buffer; `extension` is a format hint such as "mp3"
    pub fn decode_bytes(bytes: Vec<u8>, extension: &str) -> Result<AudioClip> {
        debug!("Decoding {} in-memory bytes ({})", bytes.len(), extension);

        let mut hint = Hint::new();
        hint.with_extension(extension);

        Self::decode_source(Box::new(Cursor::new(bytes)), hint)
    }

    fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<AudioClip> {
        let mss = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut interleaved = Vec::new();
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .unwrap_or(0);

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count();

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    interleaved.extend_from_slice(buf.samples());
                }
                Err(e) => {
                    warn!("Decode error: {}", e);
                    continue;
                }
            }
        }

        if interleaved.is_empty() || channels == 0 {
            return Err(Error::Decode("No audio frames decoded".to_string()));
        }

        debug!(
            "Decoded {} frames at {}Hz, {} channel(s)",
            interleaved.len() / channels,
            sample_rate,
            channels
        );

        let stereo = to_stereo(interleaved, channels);
        let resampled = Resampler::resample(stereo, sample_rate, CHANNELS)?;
        Ok(AudioClip::from_stereo(resampled)?)
    }
}

/// Normalize an interleaved buffer with `channels` channels to stereo
fn to_stereo(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    match channels {
        2 => samples,
        1 => samples.iter().flat_map(|s| [*s, *s]).collect(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo() {
        assert_eq!(to_stereo(vec![0.1, 0.2, 0.3], 1), vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_stereo_unchanged() {
        assert_eq!(to_stereo(vec![0.1, 0.2], 2), vec![0.1, 0.2]);
    }

    #[test]
    fn test_surround_keeps_front_pair() {
        let six = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        assert_eq!(to_stereo(six, 6), vec![1.0, 2.0, 7.0, 8.0]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = Decoder::decode_file(Path::new("/nonexistent/Nobody-Nothing.mp3"));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let result = Decoder::decode_bytes(vec![0x42; 1024], "mp3");
        assert!(result.is_err());
    }
}
