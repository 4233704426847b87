//! PCM audio clip
//!
//! Every clip in the mixing pipeline shares one working format so clips can be
//! concatenated without conversion:
//! - Samples are f32 (-1.0 to 1.0)
//! - Stereo interleaved: [L, R, L, R, ...]
//! - 44 100 Hz
//!
//! Fades and concatenation consume the clip and return it, so a mix reads as a
//! chain: `banter.fade_out(..).append(track.fade_in(..)).fade_out(..)`.

use crate::fade_curves::FadeCurve;
use crate::{Error, Result};

/// Working sample rate of every clip
pub const SAMPLE_RATE: u32 = 44_100;

/// Working channel count of every clip
pub const CHANNELS: u16 = 2;

/// Decoded audio in the working format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
}

impl AudioClip {
    /// Wrap interleaved stereo samples already at [`SAMPLE_RATE`]
    pub fn from_stereo(samples: Vec<f32>) -> Result<Self> {
        if samples.len() % CHANNELS as usize != 0 {
            return Err(Error::InvalidInput(format!(
                "stereo clip needs an even sample count, got {}",
                samples.len()
            )));
        }
        Ok(Self { samples })
    }

    /// Digital silence of the given length
    pub fn silent(duration_ms: u64) -> Self {
        let frames = ms_to_frames(duration_ms);
        Self {
            samples: vec![0.0; frames * CHANNELS as usize],
        }
    }

    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS as usize
    }

    /// Length in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.frames() as u64 * 1000) / SAMPLE_RATE as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Largest absolute sample value (0.0 for silence)
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Ramp the first `duration_ms` up from silence.
    ///
    /// A fade longer than the clip covers the whole clip.
    pub fn fade_in(mut self, duration_ms: u64, curve: FadeCurve) -> Self {
        let fade_frames = ms_to_frames(duration_ms).min(self.frames());
        if fade_frames == 0 {
            return self;
        }

        for frame in 0..fade_frames {
            let gain = curve.fade_in_gain(frame as f32 / fade_frames as f32);
            self.scale_frame(frame, gain);
        }
        self
    }

    /// Ramp the last `duration_ms` down to silence; the final frame is silent.
    ///
    /// A fade longer than the clip covers the whole clip.
    pub fn fade_out(mut self, duration_ms: u64, curve: FadeCurve) -> Self {
        let total = self.frames();
        let fade_frames = ms_to_frames(duration_ms).min(total);
        if fade_frames == 0 {
            return self;
        }

        let start = total - fade_frames;
        for i in 0..fade_frames {
            let gain = curve.fade_out_gain((i + 1) as f32 / fade_frames as f32);
            self.scale_frame(start + i, gain);
        }
        self
    }

    /// Concatenate `other` after this clip
    pub fn append(mut self, other: AudioClip) -> Self {
        self.samples.extend(other.samples);
        self
    }

    fn scale_frame(&mut self, frame: usize, gain: f32) {
        let base = frame * CHANNELS as usize;
        for sample in &mut self.samples[base..base + CHANNELS as usize] {
            *sample *= gain;
        }
    }
}

/// Convert milliseconds to whole frames at the working rate
pub fn ms_to_frames(duration_ms: u64) -> usize {
    ((duration_ms * SAMPLE_RATE as u64) / 1000) as usize
}
