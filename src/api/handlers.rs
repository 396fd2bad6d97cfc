//! API request handlers

use serde_json::Value;
use tracing::info;

use super::models::ProgressResponse;
use super::server::AppState;
use crate::catalog::{AggregatedCatalog, Champion, Game};
use crate::error::{RelayError, Result};
use crate::segments::{ReassemblyHandle, SegmentRequest};

/// Handle health check requests
pub async fn health_check() -> Result<Value> {
    Ok(serde_json::json!({
        "status": "healthy",
        "service": "vod-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Current progress for a video identifier
pub fn get_progress(state: &AppState, id: Option<&str>) -> Result<ProgressResponse> {
    match id {
        Some(id) if !id.is_empty() => Ok(ProgressResponse {
            progress: state.progress.get(id),
        }),
        _ => Err(RelayError::MissingParameter("Missing id".to_string())),
    }
}

/// Discover segments and render the playlist.
///
/// The progress entry is cleared when this future completes or is dropped.
pub async fn build_playlist(state: &AppState, request: &SegmentRequest) -> Result<String> {
    let progress = state.progress.track(&request.video_id);
    let count = state.locator.locate(request, &progress).await?;
    info!("🎬 Serving {}-entry playlist for {}", count, request);
    Ok(state.playlists.render(request, count))
}

/// Discover segments and start streaming their concatenation
pub async fn start_download(state: &AppState, request: SegmentRequest) -> Result<ReassemblyHandle> {
    let progress = state.progress.track(&request.video_id);
    let count = state.locator.locate(&request, &progress).await?;
    info!("⬇️ Starting download of {} ({} segments)", request, count);
    Ok(state.reassembler.spawn(request, count, progress))
}

/// Aggregated course catalog for a game
pub async fn list_courses(state: &AppState, game: Option<&str>) -> Result<AggregatedCatalog> {
    let game: Game = game.unwrap_or_default().parse()?;
    state.catalog.courses(game).await
}

/// Champion list
pub async fn list_champions(state: &AppState) -> Result<Vec<Champion>> {
    state.catalog.champions().await
}
