//! JSON endpoints

use crate::api::AppContext;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    git_hash: String,
    listeners: usize,
    segments_published: u64,
}

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "blaze-radio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        listeners: ctx.state.listener_count(),
        segments_published: ctx.state.publish_count(),
    })
}

/// GET /now-playing - Current segment metadata; 204 before the first publish
pub async fn now_playing(State(ctx): State<AppContext>) -> Response {
    match ctx.state.now_playing().await {
        Some(now_playing) => Json(now_playing).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
