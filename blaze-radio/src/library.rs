//! Music library: where a track's recorded audio comes from
//!
//! Lookups are synchronous (file read + decode) and run on the blocking pool.

use crate::audio::Decoder;
use crate::error::Result;
use crate::playlist::Track;
use blaze_common::AudioClip;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of decoded track audio
pub trait MusicLibrary: Send + Sync {
    /// Decode the audio for `track`, or fail if it is missing or unreadable
    fn load(&self, track: &Track) -> Result<AudioClip>;
}

/// Music files stored as `{root}/{artist}-{title}.mp3`
#[derive(Debug, Clone)]
pub struct FileLibrary {
    root: PathBuf,
}

impl FileLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the file for `track` is expected at
    pub fn path_for(&self, track: &Track) -> PathBuf {
        self.root
            .join(format!("{}-{}.mp3", track.artist, track.title))
    }
}

impl MusicLibrary for FileLibrary {
    fn load(&self, track: &Track) -> Result<AudioClip> {
        let path = self.path_for(track);
        debug!("Looking up {} at {}", track, path.display());
        Decoder::decode_file(&path)
    }
}
