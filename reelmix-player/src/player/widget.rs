//! Media widget capability interface
//!
//! The widget that actually decodes and renders video lives outside this
//! process (an embedded player in the UI). The engine only ever speaks
//! this capability interface: commands out, events and polled time in.
//! `RemoteWidget` is the production implementation bridging commands over
//! the event broadcast and caching the last status report from the UI.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

/// Events reported by the media widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetEvent {
    Ready,
    Playing,
    Paused,
    Ended,
    Error,
}

/// Commands sent to the media widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WidgetCommand {
    Load {
        source_ref: String,
        start_offset_secs: f64,
    },
    Play,
    Pause,
    Seek {
        absolute_secs: f64,
    },
}

/// Capability interface over the external media widget
///
/// Time queries are pull-based: the widget offers no reliable per-tick
/// push event, so the controller samples `current_time` on a bounded poll.
pub trait MediaWidget: Send + Sync {
    fn load(&self, source_ref: &str, start_offset_secs: f64);
    fn play(&self);
    fn pause(&self);
    fn seek(&self, absolute_secs: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
struct WidgetStatus {
    current_time_secs: f64,
    duration_secs: f64,
}

/// Widget bridged to a remote player over the command broadcast
///
/// Commands are fanned out to subscribed clients (SSE); the UI posts
/// status reports back, which serve the pull-based time queries.
pub struct RemoteWidget {
    command_tx: broadcast::Sender<WidgetCommand>,
    status: Arc<Mutex<WidgetStatus>>,
}

impl RemoteWidget {
    pub fn new(command_tx: broadcast::Sender<WidgetCommand>) -> Self {
        Self {
            command_tx,
            status: Arc::new(Mutex::new(WidgetStatus::default())),
        }
    }

    /// Record a status report posted by the remote player
    pub fn report_status(&self, current_time_secs: f64, duration_secs: f64) {
        let mut status = self.status.lock().unwrap();
        status.current_time_secs = current_time_secs;
        status.duration_secs = duration_secs;
    }

    fn send(&self, command: WidgetCommand) {
        debug!("Widget command: {:?}", command);
        // No subscribers just means no player is attached yet
        let _ = self.command_tx.send(command);
    }
}

impl MediaWidget for RemoteWidget {
    fn load(&self, source_ref: &str, start_offset_secs: f64) {
        // Stale time from the previous source must not leak into boundary checks
        self.report_status(0.0, 0.0);
        self.send(WidgetCommand::Load {
            source_ref: source_ref.to_string(),
            start_offset_secs,
        });
    }

    fn play(&self) {
        self.send(WidgetCommand::Play);
    }

    fn pause(&self) {
        self.send(WidgetCommand::Pause);
    }

    fn seek(&self, absolute_secs: f64) {
        self.send(WidgetCommand::Seek { absolute_secs });
    }

    fn current_time(&self) -> f64 {
        self.status.lock().unwrap().current_time_secs
    }

    fn duration(&self) -> f64 {
        self.status.lock().unwrap().duration_secs
    }
}

// The API layer keeps a handle for status reports while the controller
// owns the widget, so the shared form is also a widget
impl MediaWidget for Arc<RemoteWidget> {
    fn load(&self, source_ref: &str, start_offset_secs: f64) {
        self.as_ref().load(source_ref, start_offset_secs)
    }

    fn play(&self) {
        self.as_ref().play()
    }

    fn pause(&self) {
        self.as_ref().pause()
    }

    fn seek(&self, absolute_secs: f64) {
        self.as_ref().seek(absolute_secs)
    }

    fn current_time(&self) -> f64 {
        self.as_ref().current_time()
    }

    fn duration(&self) -> f64 {
        self.as_ref().duration()
    }
}
