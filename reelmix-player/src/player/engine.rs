//! Player engine - async driver around the clip controller
//!
//! Pumps widget events and poll ticks into the synchronous controller and
//! exposes thread-safe control methods for the API layer. The controller
//! lock is only ever held for a single synchronous transition, never
//! across an await point.

use crate::player::controller::ClipController;
use crate::player::ticker::Ticker;
use crate::player::widget::WidgetEvent;
use crate::playlist::{PlaylistEntry, PlaylistQueue};
use reelmix_common::events::ClipState;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Snapshot of playback state for the API layer
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub state: ClipState,
    pub queue_len: usize,
    pub current_index: usize,
    pub relative_secs: f64,
    pub playhead_fraction: f64,
    pub segment_widths: Vec<f64>,
}

/// Async driver around the clip controller
pub struct PlayerEngine {
    controller: Arc<Mutex<ClipController>>,
    running: Arc<AtomicBool>,
}

impl PlayerEngine {
    pub fn new(controller: ClipController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the event/tick pump in a background task
    ///
    /// Widget events and poll ticks are interleaved on one task, so the
    /// controller never sees concurrent transitions. Closing the widget
    /// event channel stops the pump.
    pub fn start(
        &self,
        mut widget_events: tokio::sync::mpsc::UnboundedReceiver<WidgetEvent>,
        mut ticker: Box<dyn Ticker>,
    ) {
        info!("Starting player engine");
        self.running.store(true, Ordering::SeqCst);

        let controller = Arc::clone(&self.controller);
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    maybe_event = widget_events.recv() => {
                        match maybe_event {
                            Some(event) => controller.lock().unwrap().on_widget_event(event),
                            None => break,
                        }
                    }
                    _ = ticker.tick() => {
                        controller.lock().unwrap().tick();
                    }
                }
            }
            debug!("Player engine pump stopped");
        });
    }

    pub fn stop(&self) {
        info!("Stopping player engine");
        self.running.store(false, Ordering::SeqCst);
    }

    // --- control surface ---

    /// Begin a playlist with its progressive first entry
    pub fn begin_with_first(&self, first: PlaylistEntry) {
        self.controller
            .lock()
            .unwrap()
            .set_queue(PlaylistQueue::new(vec![first]), true);
    }

    /// Install the full queue from the progressive second phase
    pub fn install_full_queue(&self, queue: PlaylistQueue) {
        self.controller.lock().unwrap().install_full_queue(queue);
    }

    /// Replace the merged queue (add-all), keeping the active clip
    pub fn merge_queue(&self, queue: PlaylistQueue) {
        self.controller.lock().unwrap().merge_queue(queue);
    }

    /// Reshuffle the queue, keeping the active clip playing
    pub fn reshuffle(&self) {
        self.controller.lock().unwrap().reshuffle();
    }

    pub fn play(&self) {
        self.controller.lock().unwrap().play();
    }

    pub fn pause(&self) {
        self.controller.lock().unwrap().pause();
    }

    pub fn seek_relative(&self, relative_secs: f64) {
        self.controller.lock().unwrap().seek_relative(relative_secs);
    }

    pub fn seek_fraction(&self, fraction: f64) {
        self.controller.lock().unwrap().seek_fraction(fraction);
    }

    /// Current queue contents (cloned value; queues are immutable values)
    pub fn queue(&self) -> PlaylistQueue {
        self.controller.lock().unwrap().queue().clone()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let controller = self.controller.lock().unwrap();
        PlaybackSnapshot {
            state: controller.state(),
            queue_len: controller.queue().len(),
            current_index: controller.current_index(),
            relative_secs: controller.relative_secs(),
            playhead_fraction: controller.playhead_fraction(),
            segment_widths: controller.segment_widths(),
        }
    }
}
