//! Interview and segment data model
//!
//! Interviews are the parent recordings; segments ("clips") are timestamped
//! sub-ranges of an interview and the atomic playable unit. Both shapes are
//! fixed: raw store records are normalized into them by the store adapter,
//! never spread through dynamically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A source interview recording
///
/// Immutable for the duration of a session. `source_ref` is an opaque
/// locator handed to the media widget; the engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub source_ref: String,
    pub thumbnail_url: String,
}

/// A timestamped clip within an interview
///
/// Value object: the engine never mutates a segment in place. Keyword
/// strings are lowercased at adapter boundaries; the `BTreeSet` gives
/// deterministic iteration order for co-occurrence scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub topic: String,
    pub summary_text: String,
    /// Raw timestamp range string as stored, e.g. "01:23 - 02:45".
    /// Parsed lazily; malformed input falls back to the default duration.
    pub timestamp_range: String,
    pub keywords: BTreeSet<String>,
    pub thumbnail_url: String,
}

impl Segment {
    /// Derived clip duration in seconds (never negative, never stored)
    pub fn duration_secs(&self) -> f64 {
        crate::time::clip_duration_secs(&self.timestamp_range)
    }
}
