//! Keyword index cache and inverted index
//!
//! The index is a derived, rebuildable view over the segment store: an
//! inverted map from lowercased keyword to the segments carrying it, plus
//! per-keyword counts. It owns no unique data. Builds fan out one fetch
//! task per interview and join before publishing, so a partially built
//! index is never observable; the cache slot is swapped atomically and a
//! rebuild whose slot was invalidated or refilled meanwhile is discarded
//! (last-writer-wins).

use crate::store::SegmentStore;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use reelmix_common::events::PlayerEvent;
use reelmix_common::model::{Interview, Segment};
use reelmix_common::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Inverted keyword index over the whole segment corpus
///
/// Invariant: for every segment `s` and every `k` in `s.keywords`,
/// `by_keyword[k]` contains `s` and `count_by_keyword[k]` equals
/// `by_keyword[k].len()`.
#[derive(Debug)]
pub struct KeywordIndex {
    by_keyword: HashMap<String, Vec<Segment>>,
    count_by_keyword: HashMap<String, usize>,
    all_segments: Vec<Segment>,
    interviews: HashMap<Uuid, Interview>,
    built_at: DateTime<Utc>,
}

impl KeywordIndex {
    /// Build the index from fully fetched interviews and segments
    ///
    /// Keywords are already lowercased by the store adapter; lookup keys
    /// are lowercased again at query time so callers can pass any case.
    pub fn build(
        interviews: Vec<Interview>,
        all_segments: Vec<Segment>,
        built_at: DateTime<Utc>,
    ) -> Self {
        let mut by_keyword: HashMap<String, Vec<Segment>> = HashMap::new();
        let mut count_by_keyword: HashMap<String, usize> = HashMap::new();

        for segment in &all_segments {
            for keyword in &segment.keywords {
                by_keyword
                    .entry(keyword.clone())
                    .or_default()
                    .push(segment.clone());
                *count_by_keyword.entry(keyword.clone()).or_insert(0) += 1;
            }
        }

        Self {
            by_keyword,
            count_by_keyword,
            all_segments,
            interviews: interviews.into_iter().map(|i| (i.id, i)).collect(),
            built_at,
        }
    }

    /// Segments indexed under a keyword (case-insensitive); empty if unknown
    pub fn segments_for(&self, keyword: &str) -> &[Segment] {
        self.by_keyword
            .get(&keyword.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of segments carrying a keyword; 0 for unknown keywords
    pub fn count(&self, keyword: &str) -> usize {
        self.count_by_keyword
            .get(&keyword.trim().to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Union of segments matching any of the query keywords
    ///
    /// A segment matches if its keyword set intersects the query set.
    /// Duplicates (segments carrying several query keywords) appear once.
    pub fn matching_any(&self, keywords: &[String]) -> Vec<Segment> {
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut matched = Vec::new();

        for keyword in keywords {
            for segment in self.segments_for(keyword) {
                if seen.insert(segment.id) {
                    matched.push(segment.clone());
                }
            }
        }
        matched
    }

    /// Interview a segment belongs to
    pub fn interview(&self, id: Uuid) -> Option<&Interview> {
        self.interviews.get(&id)
    }

    pub fn all_segments(&self) -> &[Segment] {
        &self.all_segments
    }

    pub fn segment_count(&self) -> usize {
        self.all_segments.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.by_keyword.len()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Cache slot guarded by the generation counter
struct Slot {
    index: Option<Arc<KeywordIndex>>,
    /// Bumped on every install and invalidate; a rebuild started against an
    /// older generation does not install its result.
    generation: u64,
}

/// TTL cache around the keyword index
///
/// `ensure_index` serves the cached index while it is younger than the
/// TTL, rebuilds otherwise, and serves a stale index when a rebuild fails
/// but a previous build is still available.
pub struct IndexCache {
    store: Arc<dyn SegmentStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    slot: RwLock<Slot>,
    event_tx: Option<broadcast::Sender<PlayerEvent>>,
}

impl IndexCache {
    pub fn new(store: Arc<dyn SegmentStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(300)),
            slot: RwLock::new(Slot {
                index: None,
                generation: 0,
            }),
            event_tx: None,
        }
    }

    /// Announce successful rebuilds on the player event broadcast
    pub fn with_event_sender(mut self, event_tx: broadcast::Sender<PlayerEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Return a valid keyword index, rebuilding if the cache is cold or expired
    pub async fn ensure_index(&self) -> Result<Arc<KeywordIndex>> {
        let started_generation = {
            let slot = self.slot.read().await;
            if let Some(index) = &slot.index {
                if self.clock.now() - index.built_at() < self.ttl {
                    return Ok(Arc::clone(index));
                }
            }
            slot.generation
        };

        match self.rebuild().await {
            Ok(index) => {
                let mut slot = self.slot.write().await;
                if slot.generation == started_generation {
                    slot.index = Some(Arc::clone(&index));
                    slot.generation += 1;
                    info!(
                        "Keyword index rebuilt: {} segments, {} keywords",
                        index.segment_count(),
                        index.keyword_count()
                    );
                    if let Some(tx) = &self.event_tx {
                        let _ = tx.send(PlayerEvent::IndexRebuilt {
                            segment_count: index.segment_count(),
                            keyword_count: index.keyword_count(),
                            timestamp: self.clock.now(),
                        });
                    }
                    Ok(index)
                } else {
                    // Superseded by a newer invalidate/rebuild; serve whatever
                    // is installed now, or our result without installing it
                    debug!("Discarding superseded index rebuild");
                    match &slot.index {
                        Some(current) => Ok(Arc::clone(current)),
                        None => Ok(index),
                    }
                }
            }
            Err(e) => {
                let slot = self.slot.read().await;
                match &slot.index {
                    Some(stale) => {
                        warn!("Index rebuild failed, serving stale index: {}", e);
                        Ok(Arc::clone(stale))
                    }
                    None => Err(Error::Index(format!("index rebuild failed: {}", e))),
                }
            }
        }
    }

    /// Clear the cache; the next `ensure_index` call rebuilds from the store
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.index = None;
        slot.generation += 1;
        debug!("Keyword index invalidated");
    }

    /// O(1) per-keyword count after `ensure_index`; unknown keyword is 0
    pub async fn count(&self, keyword: &str) -> Result<usize> {
        Ok(self.ensure_index().await?.count(keyword))
    }

    /// Fetch everything and build a fresh index
    ///
    /// One fetch task per interview; all tasks are joined before the index
    /// is constructed. Any fetch failure aborts the whole build.
    async fn rebuild(&self) -> Result<Arc<KeywordIndex>> {
        let interviews = self.store.list_interviews().await?;
        debug!("Rebuilding keyword index over {} interviews", interviews.len());

        let mut tasks = JoinSet::new();
        for interview in &interviews {
            let store = Arc::clone(&self.store);
            let interview_id = interview.id;
            tasks.spawn(async move { store.list_segments_of(interview_id).await });
        }

        let mut all_segments = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let segments = joined
                .map_err(|e| Error::Index(format!("segment fetch task panicked: {}", e)))??;
            all_segments.extend(segments);
        }

        Ok(Arc::new(KeywordIndex::build(
            interviews,
            all_segments,
            self.clock.now(),
        )))
    }
}
