//! # Blaze Common Library
//!
//! Shared code for the 102.7 The Blaze radio service:
//! - Error type (Error, Result)
//! - PCM clip type used by the mixer
//! - Fade curve definitions and calculations
//! - Configuration file resolution

pub mod clip;
pub mod config;
pub mod error;
pub mod fade_curves;

pub use clip::{AudioClip, CHANNELS, SAMPLE_RATE};
pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
