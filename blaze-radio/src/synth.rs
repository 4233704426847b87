//! Speech synthesis for DJ banter
//!
//! The Program Director only sees the [`SpeechSynthesizer`] trait. When no
//! credential or voice is configured it gets an [`UnconfiguredSynthesizer`],
//! which always fails; the Director turns that failure into silence.

use crate::audio::Decoder;
use crate::error::{Error, Result};
use async_trait::async_trait;
use blaze_common::AudioClip;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// ElevenLabs API base
const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

/// Default ElevenLabs model
pub const DEFAULT_TTS_MODEL: &str = "eleven_turbo_v2";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns banter text into audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizer name for logs
    fn name(&self) -> &'static str;

    /// Synthesize `text` into a clip in the working format
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;
}

/// Pick the synthesizer for the configured credential and voice.
///
/// Blank values count as missing.
pub fn synthesizer_from_settings(
    api_key: Option<&str>,
    voice_id: Option<&str>,
    model_id: &str,
) -> Result<Arc<dyn SpeechSynthesizer>> {
    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
    let voice_id = voice_id.map(str::trim).filter(|v| !v.is_empty());

    match (api_key, voice_id) {
        (Some(key), Some(voice)) => {
            info!("Speech synthesis: ElevenLabs voice {} ({})", voice, model_id);
            Ok(Arc::new(ElevenLabsSynthesizer::new(
                key.to_string(),
                voice.to_string(),
                model_id.to_string(),
            )?))
        }
        (None, _) => {
            warn!("No ElevenLabs API key configured - banter will be silent");
            Ok(Arc::new(UnconfiguredSynthesizer::new("no API key configured")))
        }
        (_, None) => {
            warn!("No voice id configured - banter will be silent");
            Ok(Arc::new(UnconfiguredSynthesizer::new("no voice id configured")))
        }
    }
}

/// Stand-in used when synthesis is not configured
pub struct UnconfiguredSynthesizer {
    reason: String,
}

impl UnconfiguredSynthesizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for UnconfiguredSynthesizer {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn synthesize(&self, _text: &str) -> Result<AudioClip> {
        Err(Error::SynthesisUnavailable(self.reason.clone()))
    }
}

/// ElevenLabs text-to-speech client
pub struct ElevenLabsSynthesizer {
    http_client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Blaze's voice: energetic but stable
#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.4,
            use_speaker_boost: true,
        }
    }
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: String, voice_id: String, model_id: String) -> Result<Self> {
        let http_client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            voice_id,
            model_id,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    fn name(&self) -> &'static str {
        "ElevenLabs"
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        debug!(chars = text.len(), "Requesting ElevenLabs synthesis");

        let body = TtsRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .http_client
            .post(format!("{}/text-to-speech/{}", ELEVENLABS_API_URL, self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "ElevenLabs returned {}: {}",
                status, detail
            )));
        }

        let mp3 = response.bytes().await?.to_vec();
        tokio::task::spawn_blocking(move || Decoder::decode_bytes(mp3, "mp3"))
            .await
            .map_err(|e| Error::Internal(format!("Speech decode task failed: {}", e)))?
    }
}
