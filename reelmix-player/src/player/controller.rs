//! Clip playback controller
//!
//! Owns relative-time semantics for the active clip: translates the
//! queue's declared timestamp boundaries into widget loads and seeks,
//! validates boundaries against the widget-reported duration, detects the
//! end of a clip from polled time, and auto-advances or skips.
//!
//! The controller is a synchronous state machine: widget events arrive via
//! `on_widget_event`, and time-sensitive transitions (grace delay, ready
//! timeout, position sampling) happen in `tick` against the injected
//! clock. The async engine drives both; tests drive them directly.
//!
//! State flow: Idle → Loading → Ready ⇄ {Playing, Paused} → Ended, with
//! the transient Skipping state reachable from any of them on an invalid
//! boundary, widget error, or ready timeout. Skipping always resolves to
//! advancing the queue after the grace delay.

use crate::player::widget::{MediaWidget, WidgetEvent};
use crate::playlist::{PlaylistEntry, PlaylistQueue};
use crate::timeline::Timeline;
use chrono::{DateTime, Utc};
use reelmix_common::config::EngineConfig;
use reelmix_common::events::{ClipState, PlayerEvent, SkipReason};
use reelmix_common::{parse_timestamp_range, Clock, TimestampRange, DEFAULT_CLIP_SECS};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub struct ClipController {
    widget: Box<dyn MediaWidget>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    event_tx: broadcast::Sender<PlayerEvent>,

    queue: PlaylistQueue,
    timeline: Timeline,
    current_index: usize,
    /// Parsed boundaries of the active clip within its source video
    bounds: TimestampRange,
    state: ClipState,
    /// Whether the caller wants playback running once the clip is ready
    play_intent: bool,
    /// Clip-relative position from the last poll sample
    relative_secs: f64,
    /// Relative seek to apply once the (newly switched) clip is ready
    pending_seek: Option<f64>,
    /// Last absolute seek sent to the widget (redundant-seek guard)
    last_seek_abs: Option<f64>,
    /// When a Skipping state resolves by advancing
    skip_deadline: Option<DateTime<Utc>>,
    /// When a Loading state gives up waiting for the widget
    ready_deadline: Option<DateTime<Utc>>,
}

impl ClipController {
    pub fn new(
        widget: Box<dyn MediaWidget>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        event_tx: broadcast::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            widget,
            clock,
            config,
            event_tx,
            queue: PlaylistQueue::default(),
            timeline: Timeline::default(),
            current_index: 0,
            bounds: TimestampRange {
                start_secs: 0.0,
                end_secs: DEFAULT_CLIP_SECS,
            },
            state: ClipState::Idle,
            play_intent: false,
            relative_secs: 0.0,
            pending_seek: None,
            last_seek_abs: None,
            skip_deadline: None,
            ready_deadline: None,
        }
    }

    // --- queue management ---

    /// Replace the queue and begin playback of its first entry
    ///
    /// Used both for the progressive first-entry handoff (a one-entry
    /// queue) and for direct full-queue starts. Tears down the previous
    /// playback state entirely.
    pub fn set_queue(&mut self, queue: PlaylistQueue, play_intent: bool) {
        self.timeline = Timeline::from_queue(&queue);
        self.queue = queue;
        self.current_index = 0;
        self.play_intent = play_intent;
        self.pending_seek = None;
        self.emit_queue_changed();

        if self.queue.is_empty() {
            self.teardown_clip();
            self.set_state(ClipState::Idle);
        } else {
            self.enter_current();
        }
    }

    /// Install the full queue delivered by the progressive second phase
    ///
    /// If the active entry is the full queue's entry at the same index
    /// (the usual case: the one-entry queue grew into the full shuffle),
    /// playback continues untouched; otherwise this degrades to a reset.
    pub fn install_full_queue(&mut self, queue: PlaylistQueue) {
        let current_matches = self
            .queue
            .get(self.current_index)
            .zip(queue.get(self.current_index))
            .map(|(a, b)| a.segment.id == b.segment.id)
            .unwrap_or(false);

        if current_matches {
            self.timeline = Timeline::from_queue(&queue);
            self.queue = queue;
            self.emit_queue_changed();
        } else {
            debug!("Full queue does not extend the active entry, resetting");
            self.set_queue(queue, self.play_intent);
        }
    }

    /// Replace the queue with a merged version, keeping the active clip
    ///
    /// Merges only append, so the current index stays valid.
    pub fn merge_queue(&mut self, queue: PlaylistQueue) {
        self.timeline = Timeline::from_queue(&queue);
        self.queue = queue;
        self.emit_queue_changed();
    }

    /// Reshuffle the queue without interrupting the active clip
    ///
    /// The active entry keeps playing; only its queue position moves.
    pub fn reshuffle(&mut self) {
        let reshuffled = self.queue.reshuffled();
        if let Some(current) = self.queue.get(self.current_index) {
            let id = current.segment.id;
            if let Some(at) = reshuffled.entries().iter().position(|e| e.segment.id == id) {
                self.current_index = at;
            }
        }
        self.timeline = Timeline::from_queue(&reshuffled);
        self.queue = reshuffled;
        self.emit_queue_changed();
    }

    pub fn queue(&self) -> &PlaylistQueue {
        &self.queue
    }

    // --- playback control ---

    pub fn play(&mut self) {
        self.play_intent = true;
        match self.state {
            ClipState::Ready | ClipState::Paused => {
                self.widget.play();
                self.set_state(ClipState::Playing);
            }
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        self.play_intent = false;
        if self.state == ClipState::Playing {
            self.widget.pause();
            self.set_state(ClipState::Paused);
        }
    }

    /// Seek within the active clip to a clip-relative time
    ///
    /// Translated to an absolute widget seek. A seek equal to the last
    /// applied one is dropped so redundant seek storms do not hammer the
    /// widget.
    pub fn seek_relative(&mut self, relative_secs: f64) {
        if !matches!(
            self.state,
            ClipState::Ready | ClipState::Playing | ClipState::Paused
        ) {
            debug!("Ignoring seek in state {}", self.state);
            return;
        }

        let clip_len = self.bounds.duration_secs();
        let relative = relative_secs.clamp(0.0, clip_len);
        self.apply_absolute_seek(self.bounds.start_secs + relative);
        self.relative_secs = relative;
    }

    /// Resolve a click on the aggregate timeline bar
    ///
    /// A click in the active segment is a plain relative seek; a click in
    /// another segment switches to it first and applies the seek once that
    /// clip is ready.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let Some(seek) = self.timeline.seek_from_click(fraction) else {
            return;
        };

        if seek.index == self.current_index {
            self.seek_relative(seek.relative_secs);
        } else {
            debug!(
                "Timeline click switches clip {} -> {}",
                self.current_index, seek.index
            );
            self.current_index = seek.index;
            self.pending_seek = Some(seek.relative_secs);
            self.enter_current();
        }
    }

    // --- widget events ---

    pub fn on_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Ready => self.on_ready(),
            WidgetEvent::Playing => {
                if self.state == ClipState::Paused && self.play_intent {
                    self.set_state(ClipState::Playing);
                }
            }
            WidgetEvent::Paused => {
                if self.state == ClipState::Playing && !self.play_intent {
                    self.set_state(ClipState::Paused);
                }
            }
            WidgetEvent::Ended => {
                // Source ran out before the declared end boundary
                if matches!(
                    self.state,
                    ClipState::Ready | ClipState::Playing | ClipState::Paused
                ) {
                    self.complete_current();
                }
            }
            WidgetEvent::Error => {
                if self.queue.get(self.current_index).is_some()
                    && self.state != ClipState::Skipping
                    && self.state != ClipState::Ended
                {
                    warn!("Widget error on clip {}", self.current_index);
                    self.begin_skip(SkipReason::WidgetError);
                }
            }
        }
    }

    fn on_ready(&mut self) {
        if self.state != ClipState::Loading {
            return;
        }
        self.ready_deadline = None;

        // A zero duration means the widget has not reported status yet;
        // the boundary is unverifiable, not unplayable. A truly bad source
        // still resolves through the widget's error or ended signals.
        let widget_duration = self.widget.duration();
        if widget_duration > 0.0 && self.bounds.start_secs >= widget_duration {
            // Declared start is past the end of the source: unplayable
            warn!(
                "Clip start {:.1}s is at or past source end {:.1}s, skipping",
                self.bounds.start_secs, widget_duration
            );
            self.widget.seek(0.0);
            self.begin_skip(SkipReason::UnplayableStart);
            return;
        }

        let initial_relative = self.pending_seek.take().unwrap_or(0.0);
        let mut target = (self.bounds.start_secs + initial_relative).max(0.0);
        if widget_duration > 0.0 {
            target = target.min(widget_duration - 1.0);
        }
        self.apply_absolute_seek(target);
        self.relative_secs = (target - self.bounds.start_secs).max(0.0);

        if self.play_intent {
            self.widget.play();
            self.set_state(ClipState::Playing);
        } else {
            self.set_state(ClipState::Paused);
        }
    }

    // --- time-driven transitions ---

    /// Advance deadlines and sample playback position
    ///
    /// Called on every poll tick. Position is only sampled while Playing;
    /// Skipping and Loading use the tick solely for their deadlines.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        match self.state {
            ClipState::Skipping => {
                if self.skip_deadline.is_some_and(|d| now >= d) {
                    self.skip_deadline = None;
                    self.advance();
                }
            }
            ClipState::Loading => {
                if self.ready_deadline.is_some_and(|d| now >= d) {
                    warn!("Widget never became ready for clip {}", self.current_index);
                    self.begin_skip(SkipReason::ReadyTimeout);
                }
            }
            ClipState::Playing => self.sample_position(),
            _ => {}
        }
    }

    fn sample_position(&mut self) {
        self.relative_secs = (self.widget.current_time() - self.bounds.start_secs).max(0.0);
        let clip_len = self.bounds.duration_secs();

        // Polled time is imprecise; tolerate the configured epsilon rather
        // than requiring exact equality with the end boundary
        if self.relative_secs >= clip_len - self.config.end_epsilon_secs {
            self.complete_current();
            return;
        }

        if let Some(entry) = self.queue.get(self.current_index) {
            let event = PlayerEvent::PlaybackProgress {
                segment_id: entry.segment.id,
                queue_index: self.current_index,
                relative_secs: self.relative_secs,
                clip_secs: clip_len,
                playhead_fraction: self.playhead_fraction(),
                timestamp: self.clock.now(),
            };
            let _ = self.event_tx.send(event);
        }
    }

    // --- internal transitions ---

    /// Load the clip at `current_index` into the widget
    fn enter_current(&mut self) {
        let Some(entry) = self.queue.get(self.current_index) else {
            self.playlist_ended();
            return;
        };

        self.bounds = parse_timestamp_range(&entry.segment.timestamp_range).unwrap_or(
            TimestampRange {
                start_secs: 0.0,
                end_secs: DEFAULT_CLIP_SECS,
            },
        );
        self.relative_secs = 0.0;
        self.last_seek_abs = None;
        self.skip_deadline = None;
        self.ready_deadline =
            Some(self.clock.now() + chrono::Duration::from_std(self.config.ready_timeout())
                .unwrap_or_else(|_| chrono::Duration::seconds(10)));

        info!(
            "Loading clip {}/{}: {} [{}]",
            self.current_index + 1,
            self.queue.len(),
            entry.segment.topic,
            entry.segment.timestamp_range
        );

        let event = PlayerEvent::ClipStarted {
            segment_id: entry.segment.id,
            interview_id: entry.interview.id,
            queue_index: self.current_index,
            queue_len: self.queue.len(),
            timestamp: self.clock.now(),
        };
        let _ = self.event_tx.send(event);

        let source_ref = entry.interview.source_ref.clone();
        self.set_state(ClipState::Loading);
        self.widget.load(&source_ref, self.bounds.start_secs);
    }

    /// Enter the transient Skipping state; resolves in `tick`
    fn begin_skip(&mut self, reason: SkipReason) {
        if let Some(entry) = self.queue.get(self.current_index) {
            let event = PlayerEvent::ClipSkipped {
                segment_id: entry.segment.id,
                reason,
                timestamp: self.clock.now(),
            };
            let _ = self.event_tx.send(event);
        }
        self.ready_deadline = None;
        // A pending seek belongs to the clip it was aimed at; the next
        // clip must start at its own boundary
        self.pending_seek = None;
        // The grace delay keeps near-instant skips from flickering the UI
        self.skip_deadline = Some(
            self.clock.now()
                + chrono::Duration::from_std(self.config.grace_delay())
                    .unwrap_or_else(|_| chrono::Duration::milliseconds(500)),
        );
        self.set_state(ClipState::Skipping);
    }

    fn complete_current(&mut self) {
        if let Some(entry) = self.queue.get(self.current_index) {
            let event = PlayerEvent::ClipCompleted {
                segment_id: entry.segment.id,
                timestamp: self.clock.now(),
            };
            let _ = self.event_tx.send(event);
        }
        self.advance();
    }

    fn advance(&mut self) {
        self.current_index += 1;
        self.enter_current();
    }

    fn playlist_ended(&mut self) {
        info!("Playlist ended after {} clips", self.queue.len());
        self.teardown_clip();
        self.set_state(ClipState::Ended);
        let _ = self.event_tx.send(PlayerEvent::PlaylistEnded {
            timestamp: self.clock.now(),
        });
    }

    fn teardown_clip(&mut self) {
        self.relative_secs = 0.0;
        self.pending_seek = None;
        self.last_seek_abs = None;
        self.skip_deadline = None;
        self.ready_deadline = None;
    }

    fn apply_absolute_seek(&mut self, absolute_secs: f64) {
        if self.last_seek_abs == Some(absolute_secs) {
            debug!("Dropping redundant seek to {:.2}s", absolute_secs);
            return;
        }
        self.widget.seek(absolute_secs);
        self.last_seek_abs = Some(absolute_secs);
    }

    fn set_state(&mut self, state: ClipState) {
        if self.state == state {
            return;
        }
        debug!("Playback state {} -> {}", self.state, state);
        self.state = state;
        let _ = self.event_tx.send(PlayerEvent::PlaybackStateChanged {
            state,
            timestamp: self.clock.now(),
        });
    }

    fn emit_queue_changed(&self) {
        let _ = self.event_tx.send(PlayerEvent::QueueChanged {
            queue_len: self.queue.len(),
            timestamp: self.clock.now(),
        });
    }

    // --- accessors ---

    pub fn state(&self) -> ClipState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn relative_secs(&self) -> f64 {
        self.relative_secs
    }

    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.queue.get(self.current_index)
    }

    pub fn playhead_fraction(&self) -> f64 {
        self.timeline
            .playhead_fraction(self.current_index, self.relative_secs)
    }

    pub fn segment_widths(&self) -> Vec<f64> {
        self.timeline.segment_widths()
    }
}
