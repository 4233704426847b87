//! # blaze-radio
//!
//! 102.7 The Blaze: a single Program Director task produces one mixed MP3
//! segment per track (DJ banter faded into the track) into a shared
//! now-playing buffer; every HTTP listener polls that buffer independently.

pub mod api;
pub mod audio;
pub mod banter;
pub mod config;
pub mod director;
pub mod error;
pub mod library;
pub mod playlist;
pub mod state;
pub mod synth;

pub use error::{Error, Result};
pub use state::SharedState;
