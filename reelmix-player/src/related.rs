//! Related-keyword recommendation
//!
//! Co-occurrence ranking over the keyword index: for the segments carrying
//! the query keyword, tally every other keyword appearing alongside it,
//! one point per co-occurring segment. Keywords with a global count of one
//! are excluded: a keyword appearing exactly once cannot support a
//! meaningful next playlist.

use crate::index::KeywordIndex;
use std::collections::HashMap;

/// Top related keywords for a query keyword, best first
///
/// Ties are broken by first-seen order across the query keyword's
/// segments. The query keyword itself is never returned. An unknown
/// keyword or one with no qualifying co-occurrences yields an empty vec.
pub fn related_keywords(index: &KeywordIndex, keyword: &str, limit: usize) -> Vec<String> {
    let query = keyword.trim().to_lowercase();

    // Tally in first-seen order so the stable sort preserves it for ties
    let mut scores: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for segment in index.segments_for(&query) {
        for co_keyword in &segment.keywords {
            if *co_keyword == query || index.count(co_keyword) <= 1 {
                continue;
            }
            match positions.get(co_keyword) {
                Some(&at) => scores[at].1 += 1,
                None => {
                    positions.insert(co_keyword.clone(), scores.len());
                    scores.push((co_keyword.clone(), 1));
                }
            }
        }
    }

    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores
        .into_iter()
        .take(limit)
        .map(|(keyword, _)| keyword)
        .collect()
}
