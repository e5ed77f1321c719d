//! Shared test fixtures: in-memory segment store, scriptable fake media
//! widget, and controller/event plumbing.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use reelmix_common::clock::ManualClock;
use reelmix_common::config::EngineConfig;
use reelmix_common::events::PlayerEvent;
use reelmix_common::model::{Interview, Segment};
use reelmix_common::{Error, Result};
use reelmix_player::player::{ClipController, MediaWidget};
use reelmix_player::playlist::{PlaylistEntry, PlaylistQueue};
use reelmix_player::store::SegmentStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

// --- store fixtures ---

/// In-memory segment store with a switchable failure mode
pub struct StaticStore {
    pub interviews: Vec<Interview>,
    pub segments: HashMap<Uuid, Vec<Segment>>,
    pub fail_segments: AtomicBool,
    pub interview_calls: AtomicUsize,
    pub segment_calls: AtomicUsize,
}

impl StaticStore {
    pub fn new(interviews: Vec<Interview>, segments: HashMap<Uuid, Vec<Segment>>) -> Self {
        Self {
            interviews,
            segments,
            fail_segments: AtomicBool::new(false),
            interview_calls: AtomicUsize::new(0),
            segment_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_segments.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SegmentStore for StaticStore {
    async fn list_interviews(&self) -> Result<Vec<Interview>> {
        self.interview_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.interviews.clone())
    }

    async fn list_segments_of(&self, interview_id: Uuid) -> Result<Vec<Segment>> {
        self.segment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_segments.load(Ordering::SeqCst) {
            return Err(Error::Store("segment fetch failed".to_string()));
        }
        Ok(self.segments.get(&interview_id).cloned().unwrap_or_default())
    }
}

pub fn interview(name: &str) -> Interview {
    Interview {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        role: "organizer".to_string(),
        source_ref: format!("video:{}", name),
        thumbnail_url: String::new(),
    }
}

pub fn segment_of(interview: &Interview, range: &str, keywords: &[&str]) -> Segment {
    Segment {
        id: Uuid::new_v4(),
        interview_id: interview.id,
        topic: keywords.first().unwrap_or(&"untitled").to_string(),
        summary_text: String::new(),
        timestamp_range: range.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
        thumbnail_url: String::new(),
    }
}

pub fn entry_of(interview: &Interview, range: &str, keywords: &[&str]) -> PlaylistEntry {
    PlaylistEntry {
        segment: segment_of(interview, range, keywords),
        interview: interview.clone(),
    }
}

/// One-interview corpus where each slice of keywords is one segment
pub fn corpus(segment_keywords: &[&[&str]]) -> StaticStore {
    let person = interview("fixture");
    let segments: Vec<Segment> = segment_keywords
        .iter()
        .map(|keywords| segment_of(&person, "00:10 - 00:40", keywords))
        .collect();
    let mut map = HashMap::new();
    map.insert(person.id, segments);
    StaticStore::new(vec![person], map)
}

// --- fake media widget ---

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    Load { source_ref: String, start: f64 },
    Play,
    Pause,
    Seek { absolute: f64 },
}

#[derive(Debug, Default)]
struct FakeWidgetInner {
    calls: Vec<WidgetCall>,
    current_time: f64,
    duration: f64,
}

/// Scriptable media widget recording every command
#[derive(Clone, Default)]
pub struct FakeWidget {
    inner: Arc<Mutex<FakeWidgetInner>>,
}

impl FakeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duration(&self, duration: f64) {
        self.inner.lock().unwrap().duration = duration;
    }

    pub fn set_current_time(&self, time: f64) {
        self.inner.lock().unwrap().current_time = time;
    }

    pub fn calls(&self) -> Vec<WidgetCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn last_call(&self) -> Option<WidgetCall> {
        self.inner.lock().unwrap().calls.last().cloned()
    }

    pub fn seek_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::Seek { .. }))
            .count()
    }
}

impl MediaWidget for FakeWidget {
    fn load(&self, source_ref: &str, start_offset_secs: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.current_time = start_offset_secs;
        inner.calls.push(WidgetCall::Load {
            source_ref: source_ref.to_string(),
            start: start_offset_secs,
        });
    }

    fn play(&self) {
        self.inner.lock().unwrap().calls.push(WidgetCall::Play);
    }

    fn pause(&self) {
        self.inner.lock().unwrap().calls.push(WidgetCall::Pause);
    }

    fn seek(&self, absolute_secs: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.current_time = absolute_secs;
        inner.calls.push(WidgetCall::Seek {
            absolute: absolute_secs,
        });
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().unwrap().current_time
    }

    fn duration(&self) -> f64 {
        self.inner.lock().unwrap().duration
    }
}

// --- controller harness ---

/// Controller plus the handles tests drive it with
pub struct Harness {
    pub controller: ClipController,
    pub widget: FakeWidget,
    pub clock: ManualClock,
    pub events: broadcast::Receiver<PlayerEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let widget = FakeWidget::new();
        let clock = ManualClock::new(Utc::now());
        let (event_tx, events) = broadcast::channel(256);
        let controller = ClipController::new(
            Box::new(widget.clone()),
            config,
            Arc::new(clock.clone()),
            event_tx,
        );
        Self {
            controller,
            widget,
            clock,
            events,
        }
    }

    pub fn start_queue(&mut self, entries: Vec<PlaylistEntry>) {
        self.controller.set_queue(PlaylistQueue::new(entries), true);
    }

    /// Drain every event emitted so far
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
