//! API request handlers
//!
//! The error mapping mirrors the engine's taxonomy: an empty query result
//! is a 200 with an empty body (never an error), while an index rebuild
//! failure with no usable cache is a 503 the caller may retry.

use crate::api::server::AppContext;
use crate::player::widget::WidgetEvent;
use crate::playlist::PlaylistEntry;
use crate::Error;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Error wrapper mapping engine errors onto HTTP status codes
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Retrievable failure, distinct from an empty result
            Error::Index(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Common(reelmix_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Error::InvalidState(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("API error: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "service": "reelmix-player",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

// --- keyword index ---

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: String,
}

pub async fn keyword_count(
    State(ctx): State<AppContext>,
    Query(query): Query<KeywordQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = ctx.cache.count(&query.keyword).await?;
    Ok(Json(json!({ "keyword": query.keyword, "count": count })))
}

pub async fn invalidate_index(State(ctx): State<AppContext>) -> StatusCode {
    ctx.cache.invalidate().await;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub keyword: String,
    #[serde(default = "default_related_limit")]
    pub limit: usize,
}

fn default_related_limit() -> usize {
    5
}

pub async fn related(
    State(ctx): State<AppContext>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let index = ctx.cache.ensure_index().await?;
    let related = crate::related::related_keywords(&index, &query.keyword, query.limit);
    Ok(Json(json!({ "keyword": query.keyword, "related": related })))
}

// --- playlist ---

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub keywords: Vec<String>,
}

/// Summary of the first clip handed over by the progressive protocol
#[derive(Debug, Serialize)]
pub struct FirstClip {
    pub segment_id: Uuid,
    pub interview_id: Uuid,
    pub topic: String,
    pub timestamp_range: String,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub total: usize,
    /// None is the canonical no-results signal
    pub first: Option<FirstClip>,
}

pub async fn build_playlist(
    State(ctx): State<AppContext>,
    Json(request): Json<PlaylistRequest>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    debug!("Building playlist for {:?}", request.keywords);

    let engine_first = Arc::clone(&ctx.engine);
    let engine_complete = Arc::clone(&ctx.engine);
    let mut first: Option<FirstClip> = None;
    let mut total = 0;

    ctx.assembler
        .build_progressive(
            &request.keywords,
            |entry: &PlaylistEntry, matched| {
                // Playback of the first clip starts before full-list handoff
                engine_first.begin_with_first(entry.clone());
                first = Some(FirstClip {
                    segment_id: entry.segment.id,
                    interview_id: entry.interview.id,
                    topic: entry.segment.topic.clone(),
                    timestamp_range: entry.segment.timestamp_range.clone(),
                });
                total = matched;
            },
            move |queue| {
                if !queue.is_empty() {
                    engine_complete.install_full_queue(queue);
                }
            },
        )
        .await?;

    Ok(Json(PlaylistResponse { total, first }))
}

pub async fn add_all_remaining(
    State(ctx): State<AppContext>,
    Json(request): Json<PlaylistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let current = ctx.engine.queue();
    let merged = ctx
        .assembler
        .add_all_remaining(&current, &request.keywords)
        .await?;
    let added = merged.len() - current.len();
    let total = merged.len();
    ctx.engine.merge_queue(merged);
    Ok(Json(json!({ "added": added, "total": total })))
}

pub async fn reshuffle(State(ctx): State<AppContext>) -> StatusCode {
    ctx.engine.reshuffle();
    StatusCode::NO_CONTENT
}

// --- playback control ---

pub async fn play(State(ctx): State<AppContext>) -> StatusCode {
    ctx.engine.play();
    StatusCode::NO_CONTENT
}

pub async fn pause(State(ctx): State<AppContext>) -> StatusCode {
    ctx.engine.pause();
    StatusCode::NO_CONTENT
}

/// Seek request: either clip-relative seconds or a timeline click fraction
#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub relative_secs: Option<f64>,
    pub fraction: Option<f64>,
}

pub async fn seek(
    State(ctx): State<AppContext>,
    Json(request): Json<SeekRequest>,
) -> Result<StatusCode, ApiError> {
    match (request.relative_secs, request.fraction) {
        (Some(relative), _) => ctx.engine.seek_relative(relative),
        (None, Some(fraction)) => ctx.engine.seek_fraction(fraction),
        (None, None) => {
            return Err(Error::Common(reelmix_common::Error::InvalidInput(
                "seek requires relative_secs or fraction".to_string(),
            ))
            .into())
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn playback_state(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let snapshot = ctx.engine.snapshot();
    Json(serde_json::to_value(snapshot).unwrap_or_else(|_| json!({})))
}

// --- widget bridge ---

#[derive(Debug, Deserialize)]
pub struct WidgetEventRequest {
    pub event: WidgetEvent,
}

pub async fn widget_event(
    State(ctx): State<AppContext>,
    Json(request): Json<WidgetEventRequest>,
) -> StatusCode {
    match ctx.widget_event_tx.send(request.event) {
        Ok(()) => StatusCode::NO_CONTENT,
        // Engine pump gone; nothing to deliver to
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Debug, Deserialize)]
pub struct WidgetStatusRequest {
    pub current_time_secs: f64,
    pub duration_secs: f64,
}

pub async fn widget_status(
    State(ctx): State<AppContext>,
    Json(request): Json<WidgetStatusRequest>,
) -> StatusCode {
    ctx.widget
        .report_status(request.current_time_secs, request.duration_secs);
    StatusCode::NO_CONTENT
}
