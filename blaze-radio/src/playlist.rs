//! Track list: built-in rotation, Spotify playlist provider, startup loading
//!
//! The track list is loaded once at startup and is read-only afterwards. A
//! failed or empty fetch falls back to the built-in 80s rotation so the
//! station always has something to play.

use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Spotify client-credentials token endpoint
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify Web API base
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Most tracks taken from a playlist
const MAX_PLAYLIST_TRACKS: usize = 10;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the rotation. Identity is the (artist, title) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    pub title: String,
    pub duration_seconds: u32,
}

impl Track {
    /// Create a track; the declared duration must be positive
    pub fn new(artist: impl Into<String>, title: impl Into<String>, duration_seconds: u32) -> Result<Self> {
        let artist = artist.into();
        let title = title.into();
        if duration_seconds == 0 {
            return Err(Error::Playlist(format!(
                "{} - {} has zero duration",
                artist, title
            )));
        }
        Ok(Self {
            artist,
            title,
            duration_seconds,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds as u64)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// The built-in rotation, in its unshuffled order
pub fn fallback_tracks() -> Vec<Track> {
    [
        ("Van Halen", "Jump", 240),
        ("Def Leppard", "Pour Some Sugar on Me", 285),
        ("Bon Jovi", "Livin' on a Prayer", 260),
        ("Journey", "Don't Stop Believin'", 250),
        ("Mötley Crüe", "Kickstart My Heart", 270),
    ]
    .into_iter()
    .map(|(artist, title, duration_seconds)| Track {
        artist: artist.to_string(),
        title: title.to_string(),
        duration_seconds,
    })
    .collect()
}

/// Source of the ordered track list
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Fetch the track list
    async fn fetch(&self) -> Result<Vec<Track>>;
}

/// Load the rotation once: fetch, fall back on failure, then shuffle.
///
/// With `shuffle == false` the order is exactly what the provider (or the
/// built-in list) returned.
pub async fn load_tracks<R: Rng + ?Sized>(
    provider: Option<&dyn PlaylistProvider>,
    shuffle: bool,
    rng: &mut R,
) -> Vec<Track> {
    let mut tracks = match provider {
        Some(provider) => match provider.fetch().await {
            Ok(tracks) if !tracks.is_empty() => {
                info!("Loaded {} tracks from {}", tracks.len(), provider.name());
                tracks
            }
            Ok(_) => {
                warn!("{} returned no playable tracks - using fallback", provider.name());
                fallback_tracks()
            }
            Err(e) => {
                warn!("{} error: {} - using fallback", provider.name(), e);
                fallback_tracks()
            }
        },
        None => {
            info!("No playlist configured - using built-in rotation");
            fallback_tracks()
        }
    };

    if shuffle {
        tracks.shuffle(rng);
    }
    tracks
}

/// Extract the playlist id from an open.spotify.com playlist URL
pub fn spotify_playlist_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/playlist/")?;
    let id = rest.split(['?', '/', '#']).next()?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Spotify playlist provider using the client-credentials flow
pub struct SpotifyPlaylist {
    http_client: Client,
    playlist_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyPlaylist {
    pub fn new(playlist_url: String, client_id: String, client_secret: String) -> Result<Self> {
        let http_client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            playlist_url,
            client_id,
            client_secret,
        })
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .http_client
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Playlist(format!(
                "Spotify token request returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PlaylistProvider for SpotifyPlaylist {
    fn name(&self) -> &'static str {
        "Spotify"
    }

    async fn fetch(&self) -> Result<Vec<Track>> {
        let playlist_id = spotify_playlist_id(&self.playlist_url).ok_or_else(|| {
            Error::Playlist(format!("Not a playlist URL: {}", self.playlist_url))
        })?;

        debug!(playlist_id, "Fetching Spotify playlist");
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(format!("{}/playlists/{}/tracks", SPOTIFY_API_URL, playlist_id))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Playlist(format!(
                "Spotify playlist request returned {}: {}",
                status, body
            )));
        }

        let page: PlaylistTracksPage = response.json().await?;
        Ok(page.into_tracks())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    name: String,
    duration_ms: u64,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

impl PlaylistTracksPage {
    /// First artist, name and whole seconds of at most ten tracks
    fn into_tracks(self) -> Vec<Track> {
        self.items
            .into_iter()
            .take(MAX_PLAYLIST_TRACKS)
            .filter_map(|item| {
                let track = item.track?;
                let artist = track.artists.into_iter().next()?.name;
                let seconds = u32::try_from(track.duration_ms / 1000).ok()?;
                Track::new(artist, track.name, seconds).ok()
            })
            .collect()
    }
}
