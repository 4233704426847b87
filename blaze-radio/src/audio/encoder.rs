//! MP3 encoding of mixed segments using LAME
//!
//! A fresh encoder is built per segment so each published segment is a
//! self-contained MP3 bitstream that a listener can start decoding anywhere
//! on a frame boundary.

use crate::error::{Error, Result};
use blaze_common::{AudioClip, CHANNELS, SAMPLE_RATE};
use bytes::Bytes;
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, Quality};
use tracing::debug;

/// Frames handed to LAME per encode call
const ENCODE_CHUNK_FRAMES: usize = 1152 * 64;

/// Constant-bitrate MP3 encoder settings
#[derive(Debug, Clone, Copy)]
pub struct Mp3Encoder {
    kbps: u32,
}

impl Mp3Encoder {
    /// Create an encoder for one of the standard MP3 bitrates
    pub fn new(kbps: u32) -> Result<Self> {
        if lame_bitrate(kbps).is_none() {
            return Err(Error::Config(format!(
                "Unsupported MP3 bitrate {} kbps (use 64, 96, 128, 160, 192, 224, 256 or 320)",
                kbps
            )));
        }
        Ok(Self { kbps })
    }

    pub fn kbps(&self) -> u32 {
        self.kbps
    }

    /// Encode a clip into a complete MP3 bitstream
    pub fn encode(&self, clip: &AudioClip) -> Result<Bytes> {
        let mut builder = Builder::new()
            .ok_or_else(|| Error::Encode("Failed to allocate LAME encoder".to_string()))?;
        builder
            .set_num_channels(CHANNELS as u8)
            .map_err(|e| Error::Encode(format!("Failed to set channel count: {:?}", e)))?;
        builder
            .set_sample_rate(SAMPLE_RATE)
            .map_err(|e| Error::Encode(format!("Failed to set sample rate: {:?}", e)))?;
        builder
            .set_brate(lame_bitrate(self.kbps).unwrap_or(Bitrate::Kbps192))
            .map_err(|e| Error::Encode(format!("Failed to set bitrate: {:?}", e)))?;
        builder
            .set_quality(Quality::Good)
            .map_err(|e| Error::Encode(format!("Failed to set quality: {:?}", e)))?;
        let mut lame = builder
            .build()
            .map_err(|e| Error::Encode(format!("Failed to build LAME encoder: {:?}", e)))?;

        // Roughly kbps/8 bytes per millisecond
        let estimated = clip.duration_ms() as usize * self.kbps as usize / 8 + 7200;
        let mut mp3: Vec<u8> = Vec::with_capacity(estimated);

        for chunk in clip.samples().chunks(ENCODE_CHUNK_FRAMES * CHANNELS as usize) {
            mp3.reserve(mp3lame_encoder::max_required_buffer_size(chunk.len()));
            let written = lame
                .encode(InterleavedPcm(chunk), mp3.spare_capacity_mut())
                .map_err(|e| Error::Encode(format!("LAME encoding error: {:?}", e)))?;
            // SAFETY: LAME initialised exactly `written` bytes of spare capacity.
            unsafe {
                mp3.set_len(mp3.len() + written);
            }
        }

        mp3.reserve(7200);
        let written = lame
            .flush::<FlushNoGap>(mp3.spare_capacity_mut())
            .map_err(|e| Error::Encode(format!("LAME flush error: {:?}", e)))?;
        // SAFETY: as above, `written` bytes were initialised by the flush.
        unsafe {
            mp3.set_len(mp3.len() + written);
        }

        debug!(
            "Encoded {}ms of audio to {} bytes at {}kbps",
            clip.duration_ms(),
            mp3.len(),
            self.kbps
        );

        Ok(Bytes::from(mp3))
    }
}

fn lame_bitrate(kbps: u32) -> Option<Bitrate> {
    match kbps {
        64 => Some(Bitrate::Kbps64),
        96 => Some(Bitrate::Kbps96),
        128 => Some(Bitrate::Kbps128),
        160 => Some(Bitrate::Kbps160),
        192 => Some(Bitrate::Kbps192),
        224 => Some(Bitrate::Kbps224),
        256 => Some(Bitrate::Kbps256),
        320 => Some(Bitrate::Kbps320),
        _ => None,
    }
}
