//! Server-Sent Events streams
//!
//! Two streams: `/api/events` delivers player events to UI clients, and
//! `/api/widget/commands` delivers load/play/pause/seek commands to the
//! embedded media player.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

fn sse_stream<T, F>(
    rx: tokio::sync::broadcast::Receiver<T>,
    event_name: F,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Clone + Serialize + Send + 'static,
    F: Fn(&T) -> &'static str + Send + 'static,
{
    BroadcastStream::new(rx).filter_map(move |result| {
        let item = match result {
            Ok(item) => item,
            Err(e) => {
                // Lagged or closed receiver; drop and continue
                warn!("SSE stream error: {:?}", e);
                return std::future::ready(None);
            }
        };
        let out = match serde_json::to_string(&item) {
            Ok(json) => Some(Ok(Event::default().event(event_name(&item)).data(json))),
            Err(e) => {
                warn!("Failed to serialize SSE event: {}", e);
                None
            }
        };
        std::future::ready(out)
    })
}

/// GET /api/events - player event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE event client connected");
    let rx = ctx.event_tx.subscribe();
    Sse::new(sse_stream(rx, |event| event.type_str())).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// GET /api/widget/commands - widget command stream
pub async fn command_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New widget command client connected");
    let rx = ctx.command_tx.subscribe();
    Sse::new(sse_stream(rx, |_| "WidgetCommand")).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
