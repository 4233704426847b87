//! Program Director: the station's single producer
//!
//! One cycle per track: pick the next track round-robin, write and voice a
//! banter line, load the track audio, mix banter into track, encode to MP3
//! and publish. Then wait the track's declared duration plus the pacing
//! buffer before starting the next cycle.
//!
//! Nothing in a cycle is fatal. Missing speech becomes 3 s of silence, a
//! missing track becomes silence of its declared length, and an encode
//! failure leaves the previous segment on air.

use crate::audio::Mp3Encoder;
use crate::banter::{compose_banter, pick_line};
use crate::error::{Error, Result};
use crate::library::MusicLibrary;
use crate::playlist::Track;
use crate::state::{NowPlaying, Segment, SharedState};
use crate::synth::SpeechSynthesizer;
use blaze_common::{AudioClip, FadeCurve};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Fade applied to the end of the banter
pub const BANTER_FADE_OUT_MS: u64 = 500;
/// Fade applied to the start of the track
pub const TRACK_FADE_IN_MS: u64 = 500;
/// Fade applied to the end of the whole segment
pub const SEGMENT_FADE_OUT_MS: u64 = 1000;
/// Banter length when speech is unavailable
pub const BANTER_PLACEHOLDER_MS: u64 = 3000;

/// Tunables for the cycle loop
#[derive(Debug, Clone, Copy)]
pub struct DirectorSettings {
    /// Extra wait after each track's declared duration
    pub pacing_buffer: Duration,
    /// Curve used for all three fades
    pub fade_curve: FadeCurve,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            pacing_buffer: Duration::from_secs(5),
            fade_curve: FadeCurve::Linear,
        }
    }
}

/// Mix banter into the track: banter (faded out), then track (faded in),
/// with the whole segment faded out at the end
pub fn mix(banter: AudioClip, track: AudioClip, curve: FadeCurve) -> AudioClip {
    banter
        .fade_out(BANTER_FADE_OUT_MS, curve)
        .append(track.fade_in(TRACK_FADE_IN_MS, curve))
        .fade_out(SEGMENT_FADE_OUT_MS, curve)
}

/// Decode the track's audio, or silence of its declared length. Blocking.
pub fn load_or_silence(library: &dyn MusicLibrary, track: &Track) -> AudioClip {
    match library.load(track) {
        Ok(clip) => clip,
        Err(e) => {
            warn!("Track audio unavailable for {}: {} - substituting silence", track, e);
            AudioClip::silent(track.duration_seconds as u64 * 1000)
        }
    }
}

pub struct ProgramDirector {
    tracks: Vec<Track>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    library: Arc<dyn MusicLibrary>,
    encoder: Mp3Encoder,
    state: Arc<SharedState>,
    settings: DirectorSettings,
    rng: StdRng,
}

impl ProgramDirector {
    pub fn new(
        tracks: Vec<Track>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        library: Arc<dyn MusicLibrary>,
        encoder: Mp3Encoder,
        state: Arc<SharedState>,
        settings: DirectorSettings,
    ) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::Playlist("rotation is empty".to_string()));
        }
        Ok(Self {
            tracks,
            synthesizer,
            library,
            encoder,
            state,
            settings,
            rng: StdRng::from_entropy(),
        })
    }

    /// Replace the banter RNG (deterministic line choice in tests)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track for the given cycle: position `cycle mod N` in the rotation
    pub fn select_track(&self, cycle: u64) -> &Track {
        &self.tracks[(cycle % self.tracks.len() as u64) as usize]
    }

    /// Voice the banter, or fall back to silence on any synthesis failure
    pub async fn voice_banter(&self, text: &str) -> AudioClip {
        match self.synthesizer.synthesize(text).await {
            Ok(clip) => {
                debug!("Banter voiced by {} ({} ms)", self.synthesizer.name(), clip.duration_ms());
                clip
            }
            Err(e) => {
                warn!("Banter synthesis failed: {} - using {} ms of silence", e, BANTER_PLACEHOLDER_MS);
                AudioClip::silent(BANTER_PLACEHOLDER_MS)
            }
        }
    }

    /// Load the track's audio, or silence of its declared length
    pub async fn load_track_audio(&self, track: &Track) -> Result<AudioClip> {
        let library = Arc::clone(&self.library);
        let track = track.clone();
        tokio::task::spawn_blocking(move || load_or_silence(library.as_ref(), &track))
            .await
            .map_err(|e| Error::Internal(format!("Track load task failed: {}", e)))
    }

    /// Produce and publish one segment
    pub async fn run_cycle(&mut self, cycle: u64) -> Result<NowPlaying> {
        let started = Instant::now();
        let track = self.select_track(cycle).clone();
        let banter = compose_banter(pick_line(&mut self.rng), &track);
        info!(cycle, "Blaze: {}", banter);

        let banter_clip = self.voice_banter(&banter).await;

        // Track load, mix and encode all stay off the async workers
        let library = Arc::clone(&self.library);
        let lookup = track.clone();
        let curve = self.settings.fade_curve;
        let encoder = self.encoder;
        let (duration_ms, bytes) = tokio::task::spawn_blocking(move || {
            let track_clip = load_or_silence(library.as_ref(), &lookup);
            let mixed = mix(banter_clip, track_clip, curve);
            encoder.encode(&mixed).map(|bytes| (mixed.duration_ms(), bytes))
        })
        .await
        .map_err(|e| Error::Internal(format!("Mix task failed: {}", e)))??;

        let segment = Segment {
            cycle,
            track,
            banter,
            bytes,
            duration_ms,
            published_at: Utc::now(),
        };
        let now_playing = NowPlaying::from(&segment);
        self.state.publish(segment).await;

        info!(
            cycle,
            duration_ms,
            size_bytes = now_playing.size_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Now playing: {} - {}",
            now_playing.artist,
            now_playing.title
        );
        Ok(now_playing)
    }

    /// How long to wait after publishing a segment for `track`
    pub fn pacing_for(&self, track: &Track) -> Duration {
        track.duration() + self.settings.pacing_buffer
    }

    /// Run cycles until `shutdown` flips to true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Program Director on air: {} tracks, pacing buffer {:?}, {} fades",
            self.tracks.len(),
            self.settings.pacing_buffer,
            self.settings.fade_curve
        );

        let mut cycle: u64 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let wait = self.pacing_for(self.select_track(cycle));
            if let Err(e) = self.run_cycle(cycle).await {
                error!(cycle, "Cycle failed: {} - previous segment stays on air", e);
            }

            debug!(cycle, "Next cycle in {:?}", wait);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
            cycle = cycle.wrapping_add(1);
        }

        info!("Program Director stopped after {} segments", self.state.publish_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::fallback_tracks;
    use crate::synth::UnconfiguredSynthesizer;
    use async_trait::async_trait;

    struct ToneSynthesizer {
        duration_ms: u64,
    }

    #[async_trait]
    impl SpeechSynthesizer for ToneSynthesizer {
        fn name(&self) -> &'static str {
            "tone"
        }

        async fn synthesize(&self, _text: &str) -> Result<AudioClip> {
            let frames = blaze_common::clip::ms_to_frames(self.duration_ms);
            Ok(AudioClip::from_stereo(vec![0.5; frames * 2])?)
        }
    }

    struct FailingSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for FailingSynthesizer {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn synthesize(&self, _text: &str) -> Result<AudioClip> {
            Err(Error::Synthesis("HTTP 500".to_string()))
        }
    }

    struct EmptyLibrary;

    impl MusicLibrary for EmptyLibrary {
        fn load(&self, track: &Track) -> Result<AudioClip> {
            Err(Error::Decode(format!("{} not found", track)))
        }
    }

    struct ToneLibrary;

    impl MusicLibrary for ToneLibrary {
        fn load(&self, track: &Track) -> Result<AudioClip> {
            let frames = blaze_common::clip::ms_to_frames(track.duration_seconds as u64 * 1000);
            Ok(AudioClip::from_stereo(vec![0.25; frames * 2])?)
        }
    }

    fn director(
        tracks: Vec<Track>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        library: Arc<dyn MusicLibrary>,
    ) -> ProgramDirector {
        ProgramDirector::new(
            tracks,
            synthesizer,
            library,
            Mp3Encoder::new(128).unwrap(),
            Arc::new(SharedState::new()),
            DirectorSettings::default(),
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(7))
    }

    fn short_tracks() -> Vec<Track> {
        vec![
            Track::new("Europe", "The Final Countdown", 1).unwrap(),
            Track::new("Survivor", "Eye of the Tiger", 2).unwrap(),
        ]
    }

    #[test]
    fn test_empty_rotation_is_rejected() {
        let result = ProgramDirector::new(
            Vec::new(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
            Mp3Encoder::new(128).unwrap(),
            Arc::new(SharedState::new()),
            DirectorSettings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_round_robin_wraps() {
        let d = director(
            fallback_tracks(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );

        assert_eq!(d.select_track(0).title, "Jump");
        assert_eq!(d.select_track(5).title, "Jump");
        assert_eq!(d.select_track(5).artist, "Van Halen");
        assert_eq!(d.select_track(1), d.select_track(6));
    }

    #[test]
    fn test_pacing_is_duration_plus_buffer() {
        let d = director(
            fallback_tracks(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );
        let jump = d.select_track(0).clone();
        assert_eq!(d.pacing_for(&jump), Duration::from_secs(245));
    }

    #[tokio::test]
    async fn test_unavailable_speech_gives_placeholder() {
        let d = director(
            short_tracks(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );
        let clip = d.voice_banter("Crank it!").await;
        assert_eq!(clip.duration_ms(), BANTER_PLACEHOLDER_MS);
        assert_eq!(clip.peak(), 0.0);
    }

    #[tokio::test]
    async fn test_failed_speech_gives_placeholder() {
        let d = director(short_tracks(), Arc::new(FailingSynthesizer), Arc::new(EmptyLibrary));
        let clip = d.voice_banter("Crank it!").await;
        assert_eq!(clip.duration_ms(), BANTER_PLACEHOLDER_MS);
    }

    #[tokio::test]
    async fn test_missing_track_becomes_declared_silence() {
        let d = director(
            short_tracks(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );
        let track = d.select_track(1).clone();
        let clip = d.load_track_audio(&track).await.unwrap();
        assert_eq!(clip.duration_ms(), 2000);
        assert_eq!(clip.peak(), 0.0);
    }

    #[test]
    fn test_mix_length_and_edges() {
        let banter = AudioClip::from_stereo(vec![1.0; 44_100 * 2]).unwrap();
        let track = AudioClip::from_stereo(vec![1.0; 88_200 * 2]).unwrap();
        let mixed = mix(banter, track, FadeCurve::Linear);

        assert_eq!(mixed.frames(), 44_100 + 88_200);
        let samples = mixed.samples();
        // Start of the banter is untouched
        assert_eq!(samples[0], 1.0);
        // Track starts from silence
        assert_eq!(samples[44_100 * 2], 0.0);
        // Segment ends in silence
        assert_eq!(samples[samples.len() - 1], 0.0);
        // Middle of the track is at full level
        assert_eq!(samples[(44_100 + 22_050) * 2], 1.0);
    }

    #[test]
    fn test_mix_fade_spans() {
        let banter = AudioClip::from_stereo(vec![1.0; 44_100 * 2]).unwrap();
        let track = AudioClip::from_stereo(vec![1.0; 88_200 * 2]).unwrap();
        let mixed = mix(banter, track, FadeCurve::Linear);
        let samples = mixed.samples();
        let left = |frame: usize| samples[frame * 2];

        // Banter tail-out: 500 ms ending in silence on the banter's last frame
        assert_eq!(left(44_100 - 22_050 - 1), 1.0);
        assert!(left(44_100 - 22_050) < 1.0);
        assert_eq!(left(44_100 - 1), 0.0);

        // Track head-in: 500 ms up from silence
        assert!(left(44_100 + 22_050 - 1) < 1.0);
        assert_eq!(left(44_100 + 22_050), 1.0);

        // Segment tail-out: the last 1000 ms
        let tail_start = mixed.frames() - 44_100;
        assert_eq!(left(tail_start - 1), 1.0);
        assert!(left(tail_start) < 1.0);
        assert!(left(tail_start + 22_050) > 0.49 && left(tail_start + 22_050) < 0.51);
    }

    #[tokio::test]
    async fn test_cycle_does_not_stall_runtime() {
        // Long missing track: silence, mix and encode over ~25M samples
        let tracks = vec![Track::new("Def Leppard", "Pour Some Sugar on Me", 285).unwrap()];
        let mut d = director(
            tracks,
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );

        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ticker = {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move {
                let mut worst = Duration::ZERO;
                let mut last = Instant::now();
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    let now = Instant::now();
                    worst = worst.max(now - last);
                    last = now;
                }
                worst
            })
        };

        let now_playing = d.run_cycle(0).await.unwrap();
        assert_eq!(now_playing.duration_ms, BANTER_PLACEHOLDER_MS + 285_000);

        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        let worst = ticker.await.unwrap();
        assert!(worst < Duration::from_millis(50), "runtime stalled for {:?}", worst);
    }

    #[tokio::test]
    async fn test_cycle_publishes_segment() {
        let mut d = director(
            short_tracks(),
            Arc::new(ToneSynthesizer { duration_ms: 500 }),
            Arc::new(ToneLibrary),
        );
        let state = Arc::clone(&d.state);

        let now_playing = d.run_cycle(1).await.unwrap();
        assert_eq!(now_playing.title, "Eye of the Tiger");
        assert_eq!(now_playing.duration_ms, 2500);
        assert!(now_playing.banter.ends_with("Up next: Survivor - Eye of the Tiger—crank it!"));

        let bytes = state.current_bytes().await.unwrap();
        assert_eq!(bytes.len(), now_playing.size_bytes);
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn test_cycle_survives_all_collaborators_failing() {
        let mut d = director(short_tracks(), Arc::new(FailingSynthesizer), Arc::new(EmptyLibrary));
        let now_playing = d.run_cycle(0).await.unwrap();
        assert_eq!(now_playing.duration_ms, BANTER_PLACEHOLDER_MS + 1000);
        assert_eq!(d.state.publish_count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let d = director(
            short_tracks(),
            Arc::new(UnconfiguredSynthesizer::new("test")),
            Arc::new(EmptyLibrary),
        );
        let state = Arc::clone(&d.state);
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(d.run(rx));

        tokio::time::timeout(Duration::from_secs(30), async {
            while state.publish_count() == 0 {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
