//! blaze-radio configuration
//!
//! Loaded once at startup. Precedence per field:
//! 1. Command-line flag
//! 2. Environment variable (clap `env`)
//! 3. TOML config file
//! 4. Compiled default

use crate::audio::Mp3Encoder;
use crate::error::{Error, Result};
use crate::synth::DEFAULT_TTS_MODEL;
use blaze_common::FadeCurve;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MUSIC_DIR: &str = "static/music";
pub const DEFAULT_PACING_BUFFER_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_BITRATE_KBPS: u32 = 192;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "BLAZE_CONFIG";

/// Command-line arguments for blaze-radio
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "blaze-radio")]
#[command(about = "102.7 The Blaze - an always-on internet radio station")]
#[command(version)]
pub struct CliArgs {
    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// ElevenLabs API key; banter is silent without it
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub elevenlabs_api_key: Option<String>,

    /// ElevenLabs voice id; banter is silent without it
    #[arg(long, env = "VOICE_ID")]
    pub voice_id: Option<String>,

    /// ElevenLabs model id
    #[arg(long, env = "ELEVENLABS_MODEL")]
    pub tts_model: Option<String>,

    /// Spotify playlist URL; the built-in rotation is used without it
    #[arg(long, env = "SPOTIFY_PLAYLIST_URL")]
    pub spotify_playlist_url: Option<String>,

    /// Spotify client id for the client-credentials flow
    #[arg(long, env = "SPOTIPY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    /// Spotify client secret for the client-credentials flow
    #[arg(long, env = "SPOTIPY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Folder holding `{artist}-{title}.mp3` files
    #[arg(long, env = "BLAZE_MUSIC_DIR")]
    pub music_dir: Option<PathBuf>,

    /// Extra seconds the Director waits after each track
    #[arg(long, env = "BLAZE_PACING_BUFFER_SECS")]
    pub pacing_buffer_secs: Option<u64>,

    /// Milliseconds between buffer reads on each stream connection
    #[arg(long, env = "BLAZE_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Shuffle the rotation once at startup
    #[arg(long, env = "BLAZE_SHUFFLE")]
    pub shuffle: Option<bool>,

    /// MP3 bitrate in kbps
    #[arg(long, env = "BLAZE_BITRATE_KBPS")]
    pub bitrate_kbps: Option<u32>,

    /// Fade curve for all transitions (linear, exponential, logarithmic, s-curve, equal-power)
    #[arg(long, env = "BLAZE_FADE_CURVE")]
    pub fade_curve: Option<String>,
}

/// Values read from the TOML config file; every field is optional
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub elevenlabs_api_key: Option<String>,
    pub voice_id: Option<String>,
    pub tts_model: Option<String>,
    pub spotify_playlist_url: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub music_dir: Option<PathBuf>,
    pub pacing_buffer_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub shuffle: Option<bool>,
    pub bitrate_kbps: Option<u32>,
    pub fade_curve: Option<FadeCurve>,
}

/// Fully resolved station configuration
#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub port: u16,
    pub elevenlabs_api_key: Option<String>,
    pub voice_id: Option<String>,
    pub tts_model: String,
    pub spotify_playlist_url: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub music_dir: PathBuf,
    pub pacing_buffer: Duration,
    pub poll_interval: Duration,
    pub shuffle: bool,
    pub encoder: Mp3Encoder,
    pub fade_curve: FadeCurve,
}

impl RadioConfig {
    /// Load the config file named by the arguments (if any) and merge
    pub fn load(args: CliArgs) -> Result<Self> {
        let file: FileConfig =
            blaze_common::config::load_or_default(args.config.as_deref(), CONFIG_ENV_VAR)?;
        Self::merge(args, file)
    }

    /// Merge command line/environment values over file values over defaults
    pub fn merge(args: CliArgs, file: FileConfig) -> Result<Self> {
        let fade_curve = match args.fade_curve {
            Some(name) => name.parse::<FadeCurve>()?,
            None => file.fade_curve.unwrap_or_default(),
        };

        let poll_interval_ms = args
            .poll_interval_ms
            .or(file.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }

        let encoder = Mp3Encoder::new(
            args.bitrate_kbps
                .or(file.bitrate_kbps)
                .unwrap_or(DEFAULT_BITRATE_KBPS),
        )?;

        Ok(Self {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            elevenlabs_api_key: args.elevenlabs_api_key.or(file.elevenlabs_api_key),
            voice_id: args.voice_id.or(file.voice_id),
            tts_model: args
                .tts_model
                .or(file.tts_model)
                .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            spotify_playlist_url: args.spotify_playlist_url.or(file.spotify_playlist_url),
            spotify_client_id: args.spotify_client_id.or(file.spotify_client_id),
            spotify_client_secret: args.spotify_client_secret.or(file.spotify_client_secret),
            music_dir: args
                .music_dir
                .or(file.music_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MUSIC_DIR)),
            pacing_buffer: Duration::from_secs(
                args.pacing_buffer_secs
                    .or(file.pacing_buffer_secs)
                    .unwrap_or(DEFAULT_PACING_BUFFER_SECS),
            ),
            poll_interval: Duration::from_millis(poll_interval_ms),
            shuffle: args.shuffle.or(file.shuffle).unwrap_or(true),
            encoder,
            fade_curve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RadioConfig::merge(CliArgs::default(), FileConfig::default()).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.music_dir, PathBuf::from("static/music"));
        assert_eq!(config.pacing_buffer, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.shuffle);
        assert_eq!(config.encoder.kbps(), 192);
        assert_eq!(config.fade_curve, FadeCurve::Linear);
        assert_eq!(config.tts_model, "eleven_turbo_v2");
        assert!(config.elevenlabs_api_key.is_none());
        assert!(config.spotify_playlist_url.is_none());
    }

    #[test]
    fn test_args_override_file() {
        let args = CliArgs {
            port: Some(9000),
            voice_id: Some("cli-voice".to_string()),
            ..Default::default()
        };
        let file = FileConfig {
            port: Some(7000),
            voice_id: Some("file-voice".to_string()),
            shuffle: Some(false),
            ..Default::default()
        };

        let config = RadioConfig::merge(args, file).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.voice_id.as_deref(), Some("cli-voice"));
        assert!(!config.shuffle);
    }

    #[test]
    fn test_file_fade_curve_parses() {
        let file: FileConfig = toml::from_str("fade_curve = \"s-curve\"\nport = 1234\n").unwrap();
        let config = RadioConfig::merge(CliArgs::default(), file).unwrap();
        assert_eq!(config.fade_curve, FadeCurve::SCurve);
        assert_eq!(config.port, 1234);
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        assert!(toml::from_str::<FileConfig>("volume = 11\n").is_err());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let bad_curve = CliArgs {
            fade_curve: Some("wobble".to_string()),
            ..Default::default()
        };
        assert!(RadioConfig::merge(bad_curve, FileConfig::default()).is_err());

        let bad_bitrate = CliArgs {
            bitrate_kbps: Some(100),
            ..Default::default()
        };
        assert!(RadioConfig::merge(bad_bitrate, FileConfig::default()).is_err());

        let bad_poll = CliArgs {
            poll_interval_ms: Some(0),
            ..Default::default()
        };
        assert!(RadioConfig::merge(bad_poll, FileConfig::default()).is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["blaze-radio", "--port", "9999", "--shuffle", "false"]);
        assert_eq!(args.port, Some(9999));
        assert_eq!(args.shuffle, Some(false));
    }
}
