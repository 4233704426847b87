//! Sample rate conversion using rubato
//!
//! Converts decoded audio to the 44.1 kHz working rate before mixing.

use crate::error::{Error, Result};
use blaze_common::SAMPLE_RATE;
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Stateless resampler to the working rate
pub struct Resampler;

impl Resampler {
    /// Resample interleaved audio to [`SAMPLE_RATE`].
    ///
    /// Input already at the working rate is returned unchanged.
    pub fn resample(input: Vec<f32>, input_rate: u32, channels: u16) -> Result<Vec<f32>> {
        if input_rate == SAMPLE_RATE {
            return Ok(input);
        }
        if input_rate == 0 || channels == 0 {
            return Err(Error::Decode(format!(
                "Cannot resample {} Hz / {} channels",
                input_rate, channels
            )));
        }

        let planar = Self::deinterleave(&input, channels);
        let input_frames = planar[0].len();
        if input_frames == 0 {
            return Ok(Vec::new());
        }

        debug!(
            "Resampling {} frames from {}Hz to {}Hz",
            input_frames, input_rate, SAMPLE_RATE
        );

        // One chunk covering the whole clip
        let mut resampler = FastFixedIn::<f32>::new(
            SAMPLE_RATE as f64 / input_rate as f64,
            1.0,
            PolynomialDegree::Septic,
            input_frames,
            channels as usize,
        )
        .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

        let output = resampler
            .process(&planar, None)
            .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

        Ok(Self::interleave(output))
    }

    /// [L, R, L, R, ...] -> [[L, L, ...], [R, R, ...]]
    fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
        let num_channels = channels as usize;
        let num_frames = samples.len() / num_channels;
        let mut planar = vec![Vec::with_capacity(num_frames); num_channels];

        for frame in samples.chunks_exact(num_channels) {
            for (ch, sample) in frame.iter().enumerate() {
                planar[ch].push(*sample);
            }
        }
        planar
    }

    /// [[L, L, ...], [R, R, ...]] -> [L, R, L, R, ...]
    fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
        let Some(first) = planar.first() else {
            return Vec::new();
        };
        let num_frames = first.len();
        let mut interleaved = Vec::with_capacity(num_frames * planar.len());

        for frame_idx in 0..num_frames {
            for channel in &planar {
                interleaved.push(channel[frame_idx]);
            }
        }
        interleaved
    }
}
