//! Error types for blaze-radio
//!
//! Most of these never escape a cycle: the Program Director turns synthesis,
//! decode and playlist failures into silence or fallback data and logs them.

use thiserror::Error;

/// Main error type for blaze-radio
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playlist provider errors (auth, fetch, bad URL)
    #[error("Playlist error: {0}")]
    Playlist(String),

    /// Speech synthesis call failed
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Speech synthesis has no credential or voice configured
    #[error("Speech synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    /// Audio decoding or resampling errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// MP3 encoding errors
    #[error("Audio encode error: {0}")]
    Encode(String),

    /// Outbound HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from blaze-common
    #[error(transparent)]
    Common(#[from] blaze_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using blaze-radio Error
pub type Result<T> = std::result::Result<T, Error>;
