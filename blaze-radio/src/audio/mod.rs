//! Audio primitives: decode to the working format, resample, encode to MP3
//!
//! Everything here is synchronous and CPU bound. Callers on the async runtime
//! go through `tokio::task::spawn_blocking`.

pub mod decoder;
pub mod encoder;
pub mod resampler;

pub use decoder::Decoder;
pub use encoder::Mp3Encoder;
pub use resampler::Resampler;
