//! Event types for the reelmix event system
//!
//! `PlayerEvent` is broadcast by the player engine and streamed to UI
//! clients over SSE. Every variant carries its own timestamp so consumers
//! can order events without trusting transport latency.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clip playback state
///
/// `Skipping` is the transient state entered on an unplayable boundary,
/// widget error, or ready timeout; it always resolves by advancing the
/// queue (or ending the playlist) after the configured grace delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Skipping,
    Ended,
}

impl std::fmt::Display for ClipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipState::Idle => write!(f, "idle"),
            ClipState::Loading => write!(f, "loading"),
            ClipState::Ready => write!(f, "ready"),
            ClipState::Playing => write!(f, "playing"),
            ClipState::Paused => write!(f, "paused"),
            ClipState::Skipping => write!(f, "skipping"),
            ClipState::Ended => write!(f, "ended"),
        }
    }
}

/// Why a clip was skipped rather than played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Declared start offset is at or past the end of the source video
    UnplayableStart,
    /// The media widget reported an error for this source
    WidgetError,
    /// The widget never became ready within the timeout
    ReadyTimeout,
}

/// Reelmix event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback state changed
    PlaybackStateChanged {
        state: ClipState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip started playing
    ClipStarted {
        segment_id: Uuid,
        interview_id: Uuid,
        queue_index: usize,
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip played through to its end boundary
    ClipCompleted {
        segment_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip was skipped without being played
    ClipSkipped {
        segment_id: Uuid,
        reason: SkipReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents changed (new playlist, add-all merge, reshuffle)
    QueueChanged {
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The last clip in the queue finished or was skipped
    PlaylistEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback position update (sent on each poll tick while playing)
    PlaybackProgress {
        segment_id: Uuid,
        queue_index: usize,
        relative_secs: f64,
        clip_secs: f64,
        playhead_fraction: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The keyword index was rebuilt
    IndexRebuilt {
        segment_count: usize,
        keyword_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event type string used as the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::ClipStarted { .. } => "ClipStarted",
            PlayerEvent::ClipCompleted { .. } => "ClipCompleted",
            PlayerEvent::ClipSkipped { .. } => "ClipSkipped",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::PlaylistEnded { .. } => "PlaylistEnded",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::IndexRebuilt { .. } => "IndexRebuilt",
        }
    }
}
