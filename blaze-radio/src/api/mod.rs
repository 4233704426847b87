//! HTTP surface of the station
//!
//! Routes:
//! - `GET /`            landing page with an embedded player
//! - `GET /stream.mp3`  endless MP3 stream polled from the shared buffer
//! - `GET /health`      health check
//! - `GET /now-playing` metadata of the current segment
//! - `GET /events`      SSE feed of publishes and listener changes

pub mod handlers;
pub mod sse;
pub mod stream;
pub mod ui;

use crate::state::SharedState;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    /// Wait between buffer reads on each stream connection
    pub poll_interval: Duration,
    /// Flips to true when the server is shutting down; ends open streams
    pub shutdown: watch::Receiver<bool>,
}

/// Build the application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/stream.mp3", get(stream::stream_mp3))
        .route("/health", get(handlers::health))
        .route("/now-playing", get(handlers::now_playing))
        .route("/events", get(sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // The landing page may be hosted elsewhere
        .layer(CorsLayer::permissive())
}
