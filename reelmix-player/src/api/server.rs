//! HTTP server setup and routing
//!
//! Sets up the Axum server with control endpoints and the two SSE streams
//! (player events for the UI, widget commands for the embedded player).

use crate::index::IndexCache;
use crate::player::widget::{RemoteWidget, WidgetCommand, WidgetEvent};
use crate::player::PlayerEngine;
use crate::playlist::PlaylistAssembler;
use crate::{Error, Result};
use axum::{
    routing::{get, post},
    Router,
};
use reelmix_common::events::PlayerEvent;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub cache: Arc<IndexCache>,
    pub assembler: Arc<PlaylistAssembler>,
    pub engine: Arc<PlayerEngine>,
    pub widget: Arc<RemoteWidget>,
    /// Widget events posted by the remote player feed the engine pump
    pub widget_event_tx: mpsc::UnboundedSender<WidgetEvent>,
    /// Player event broadcast for the SSE stream
    pub event_tx: broadcast::Sender<PlayerEvent>,
    /// Widget command broadcast for the embedded player's SSE stream
    pub command_tx: broadcast::Sender<WidgetCommand>,
}

/// Build the application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/status", get(super::handlers::status))
        // Keyword index
        .route("/api/index/count", get(super::handlers::keyword_count))
        .route("/api/index/invalidate", post(super::handlers::invalidate_index))
        .route("/api/related", get(super::handlers::related))
        // Playlist
        .route("/api/playlist", post(super::handlers::build_playlist))
        .route("/api/playlist/add-all", post(super::handlers::add_all_remaining))
        .route("/api/playlist/reshuffle", post(super::handlers::reshuffle))
        // Playback control
        .route("/api/playback/play", post(super::handlers::play))
        .route("/api/playback/pause", post(super::handlers::pause))
        .route("/api/playback/seek", post(super::handlers::seek))
        .route("/api/playback/state", get(super::handlers::playback_state))
        // Widget bridge
        .route("/api/widget/event", post(super::handlers::widget_event))
        .route("/api/widget/status", post(super::handlers::widget_status))
        // SSE streams
        .route("/api/events", get(super::sse::event_stream))
        .route("/api/widget/commands", get(super::sse::command_stream))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Run the HTTP API server
pub async fn run(ctx: AppContext, port: u16) -> Result<()> {
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("failed to bind {}: {}", addr, e)))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    Ok(())
}
