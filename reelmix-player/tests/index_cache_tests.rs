//! Keyword index cache tests
//!
//! TTL behavior, stale-but-available fallback, invalidation, and the
//! count/postings invariant after a full fan-out build.

mod helpers;

use chrono::Utc;
use helpers::{corpus, interview, segment_of, StaticStore};
use reelmix_common::clock::ManualClock;
use reelmix_player::index::IndexCache;
use reelmix_player::Error;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn cache_over(store: Arc<StaticStore>, ttl_secs: u64, clock: ManualClock) -> IndexCache {
    IndexCache::new(store, Duration::from_secs(ttl_secs), Arc::new(clock))
}

#[tokio::test]
async fn test_counts_match_postings_after_build() {
    let store = Arc::new(corpus(&[
        &["sit-ins", "greensboro"],
        &["sit-ins"],
        &["march"],
    ]));
    let cache = cache_over(store, 300, ManualClock::new(Utc::now()));

    let index = cache.ensure_index().await.unwrap();
    assert_eq!(index.count("sit-ins"), index.segments_for("sit-ins").len());
    assert_eq!(index.count("sit-ins"), 2);
    assert_eq!(index.count("unknown"), 0);
    assert_eq!(cache.count("march").await.unwrap(), 1);
}

#[tokio::test]
async fn test_within_ttl_returns_same_cache_object() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    let clock = ManualClock::new(Utc::now());
    let cache = cache_over(Arc::clone(&store), 300, clock.clone());

    let first = cache.ensure_index().await.unwrap();
    clock.advance_secs(299);
    let second = cache.ensure_index().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.interview_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_after_ttl_expiry_rebuilds_with_new_built_at() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    let clock = ManualClock::new(Utc::now());
    let cache = cache_over(Arc::clone(&store), 300, clock.clone());

    let first = cache.ensure_index().await.unwrap();
    clock.advance_secs(301);
    let second = cache.ensure_index().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.built_at() > first.built_at());
    assert_eq!(store.interview_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_forces_rebuild() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    let cache = cache_over(Arc::clone(&store), 300, ManualClock::new(Utc::now()));

    cache.ensure_index().await.unwrap();
    cache.invalidate().await;
    cache.ensure_index().await.unwrap();

    assert_eq!(store.interview_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_build_failure_serves_stale_cache() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    let clock = ManualClock::new(Utc::now());
    let cache = cache_over(Arc::clone(&store), 300, clock.clone());

    let first = cache.ensure_index().await.unwrap();

    // Expire the cache, then make rebuilds fail
    clock.advance_secs(301);
    store.set_failing(true);

    let served = cache.ensure_index().await.unwrap();
    assert!(Arc::ptr_eq(&first, &served), "stale cache should be served");
}

#[tokio::test]
async fn test_build_failure_without_cache_is_an_error() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    store.set_failing(true);
    let cache = cache_over(store, 300, ManualClock::new(Utc::now()));

    match cache.ensure_index().await {
        Err(Error::Index(_)) => {}
        other => panic!("expected Error::Index, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_fan_out_covers_every_interview() {
    let a = interview("a");
    let b = interview("b");
    let c = interview("c");
    let mut segments = HashMap::new();
    segments.insert(a.id, vec![segment_of(&a, "00:00 - 01:00", &["sit-ins"])]);
    segments.insert(b.id, vec![segment_of(&b, "00:00 - 01:00", &["sit-ins"])]);
    segments.insert(c.id, vec![]);
    let store = Arc::new(StaticStore::new(vec![a, b, c], segments));

    let cache = cache_over(Arc::clone(&store), 300, ManualClock::new(Utc::now()));
    let index = cache.ensure_index().await.unwrap();

    assert_eq!(index.segment_count(), 2);
    assert_eq!(index.count("sit-ins"), 2);
    assert_eq!(store.segment_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rebuild_announces_on_event_broadcast() {
    let store = Arc::new(corpus(&[&["sit-ins"], &["march"]]));
    let (event_tx, mut event_rx) = tokio::sync::broadcast::channel(16);
    let cache = IndexCache::new(
        store,
        Duration::from_secs(300),
        Arc::new(ManualClock::new(Utc::now())),
    )
    .with_event_sender(event_tx);

    cache.ensure_index().await.unwrap();

    match event_rx.try_recv().unwrap() {
        reelmix_common::events::PlayerEvent::IndexRebuilt {
            segment_count,
            keyword_count,
            ..
        } => {
            assert_eq!(segment_count, 2);
            assert_eq!(keyword_count, 2);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_keyword_is_count_zero_not_error() {
    let store = Arc::new(corpus(&[&["sit-ins"]]));
    let cache = cache_over(store, 300, ManualClock::new(Utc::now()));

    assert_eq!(cache.count("does-not-exist").await.unwrap(), 0);
}
