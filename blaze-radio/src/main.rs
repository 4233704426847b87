//! 102.7 The Blaze - main entry point
//!
//! Loads configuration and the track rotation, starts the Program Director
//! task and serves the stream until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use blaze_radio::api::{self, AppContext};
use blaze_radio::config::{CliArgs, RadioConfig};
use blaze_radio::director::{DirectorSettings, ProgramDirector};
use blaze_radio::library::FileLibrary;
use blaze_radio::playlist::{load_tracks, PlaylistProvider, SpotifyPlaylist};
use blaze_radio::synth::synthesizer_from_settings;
use blaze_radio::SharedState;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blaze_radio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting blaze-radio v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = RadioConfig::load(CliArgs::parse()).context("Failed to load configuration")?;
    info!("Music folder: {}", config.music_dir.display());
    info!("MP3 bitrate: {} kbps", config.encoder.kbps());

    // Track rotation, loaded once
    let provider = spotify_provider(&config);
    let mut rng = StdRng::from_entropy();
    let tracks = load_tracks(provider.as_deref(), config.shuffle, &mut rng).await;
    for (i, track) in tracks.iter().enumerate() {
        info!("  {:>2}. {} ({} s)", i + 1, track, track.duration_seconds);
    }

    let synthesizer = synthesizer_from_settings(
        config.elevenlabs_api_key.as_deref(),
        config.voice_id.as_deref(),
        &config.tts_model,
    )
    .context("Failed to create speech synthesizer")?;
    let library = Arc::new(FileLibrary::new(config.music_dir.clone()));
    let state = Arc::new(SharedState::new());

    let director = ProgramDirector::new(
        tracks,
        synthesizer,
        library,
        config.encoder,
        Arc::clone(&state),
        DirectorSettings {
            pacing_buffer: config.pacing_buffer,
            fade_curve: config.fade_curve,
        },
    )
    .context("Failed to create Program Director")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let director_task = tokio::spawn(director.run(shutdown_rx.clone()));

    let app = api::build_router(AppContext {
        state,
        poll_interval: config.poll_interval,
        shutdown: shutdown_rx.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Server error")?;

    if let Err(e) = director_task.await {
        warn!("Program Director task ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Spotify provider when the URL and both credentials are configured
fn spotify_provider(config: &RadioConfig) -> Option<Box<dyn PlaylistProvider>> {
    let url = config.spotify_playlist_url.clone()?;
    let (Some(client_id), Some(client_secret)) = (
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    ) else {
        warn!("Spotify playlist configured without client credentials - using built-in rotation");
        return None;
    };

    match SpotifyPlaylist::new(url, client_id, client_secret) {
        Ok(provider) => Some(Box::new(provider)),
        Err(e) => {
            warn!("Spotify playlist unusable: {} - using built-in rotation", e);
            None
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
