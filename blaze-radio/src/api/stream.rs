//! Stream Publisher: `/stream.mp3`
//!
//! Every connection runs its own read loop against the shared buffer. Each
//! poll tick re-sends the whole current segment; ticks before the first
//! publish send nothing. The body only ends when the client goes away or
//! the server starts shutting down.

use crate::api::AppContext;
use crate::state::SharedState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// GET /stream.mp3
pub async fn stream_mp3(State(ctx): State<AppContext>) -> Response {
    let body = Body::from_stream(listener_stream(ctx.state, ctx.poll_interval, ctx.shutdown));
    (
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"blaze.mp3\""),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Endless byte stream for one listener
pub fn listener_stream(
    state: Arc<SharedState>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    async_stream::stream! {
        let guard = state.register_listener();
        info!(listeners = guard.listeners(), "Listener connected");

        while !*shutdown.borrow() {
            match state.current_bytes().await {
                Some(bytes) => yield Ok(bytes),
                None => debug!("Nothing on air yet"),
            }

            // A dropped sender disables the second branch
            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                Ok(()) = shutdown.changed() => {}
            }
        }
        drop(guard);
    }
}
