//! Playlist assembly and progressive delivery
//!
//! A playlist is the shuffled set of segments matching a keyword query.
//! Delivery is two-phase: the first entry is handed over synchronously so
//! playback can start immediately, and the full list follows on the next
//! scheduler tick so render-start is never blocked behind full-list
//! processing. Queue values are immutable: merge and reshuffle produce new
//! queues rather than mutating in place.

use crate::index::IndexCache;
use crate::Result;
use rand::seq::SliceRandom;
use reelmix_common::model::{Interview, Segment};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// One playable queue entry: a segment plus its parent interview
///
/// The interview is carried alongside because the playback controller
/// needs its `source_ref` to load the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub segment: Segment,
    pub interview: Interview,
}

impl PlaylistEntry {
    pub fn duration_secs(&self) -> f64 {
        self.segment.duration_secs()
    }
}

/// Ordered clip queue for one keyword query
///
/// Mutations (merge, reshuffle) return new queue values; concurrent
/// readers never observe a half-updated queue.
#[derive(Debug, Clone, Default)]
pub struct PlaylistQueue {
    entries: Vec<PlaylistEntry>,
}

impl PlaylistQueue {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_segment(&self, id: Uuid) -> bool {
        self.entries.iter().any(|e| e.segment.id == id)
    }

    /// New queue with `additions` appended, skipping segment ids already
    /// present. Idempotent: merging the same set twice adds nothing.
    pub fn merged_with(&self, additions: &[PlaylistEntry]) -> PlaylistQueue {
        let present: HashSet<Uuid> = self.entries.iter().map(|e| e.segment.id).collect();
        let mut entries = self.entries.clone();
        entries.extend(
            additions
                .iter()
                .filter(|e| !present.contains(&e.segment.id))
                .cloned(),
        );
        PlaylistQueue { entries }
    }

    /// New queue with the same entries in fresh uniform random order
    pub fn reshuffled(&self) -> PlaylistQueue {
        let mut entries = self.entries.clone();
        entries.shuffle(&mut rand::thread_rng());
        PlaylistQueue { entries }
    }
}

/// Builds shuffled playlists from the keyword index
pub struct PlaylistAssembler {
    cache: Arc<IndexCache>,
}

impl PlaylistAssembler {
    pub fn new(cache: Arc<IndexCache>) -> Self {
        Self { cache }
    }

    /// Resolve and shuffle the segments matching any of `keywords`
    async fn matched_entries(&self, keywords: &[String]) -> Result<Vec<PlaylistEntry>> {
        let index = self.cache.ensure_index().await?;

        let mut entries: Vec<PlaylistEntry> = Vec::new();
        for segment in index.matching_any(keywords) {
            match index.interview(segment.interview_id) {
                Some(interview) => entries.push(PlaylistEntry {
                    interview: interview.clone(),
                    segment,
                }),
                // Orphaned segment rows are excluded rather than breaking playback
                None => warn!(
                    "Segment {} references unknown interview {}",
                    segment.id, segment.interview_id
                ),
            }
        }
        Ok(entries)
    }

    /// Build a playlist with two-phase progressive delivery
    ///
    /// An empty match set calls `on_complete` with an empty queue and never
    /// calls `on_first`; that is the canonical no-results signal, not an
    /// error. Otherwise `on_first` runs synchronously with the first
    /// shuffled entry before control is yielded, and `on_complete` receives
    /// the full queue on the next scheduler tick.
    pub async fn build_progressive<F, G>(
        &self,
        keywords: &[String],
        on_first: F,
        on_complete: G,
    ) -> Result<()>
    where
        F: FnOnce(&PlaylistEntry, usize),
        G: FnOnce(PlaylistQueue),
    {
        let mut entries = self.matched_entries(keywords).await?;
        if entries.is_empty() {
            debug!("No segments match {:?}", keywords);
            on_complete(PlaylistQueue::default());
            return Ok(());
        }

        entries.shuffle(&mut rand::thread_rng());
        on_first(&entries[0], entries.len());

        // Deliver the full queue on the next tick, not in this call stack
        tokio::task::yield_now().await;
        on_complete(PlaylistQueue::new(entries));
        Ok(())
    }

    /// New queue with every remaining match for `keywords` merged in
    ///
    /// Idempotent set-difference by segment id; never produces duplicate
    /// queue entries.
    pub async fn add_all_remaining(
        &self,
        queue: &PlaylistQueue,
        keywords: &[String],
    ) -> Result<PlaylistQueue> {
        let entries = self.matched_entries(keywords).await?;
        Ok(queue.merged_with(&entries))
    }
}
