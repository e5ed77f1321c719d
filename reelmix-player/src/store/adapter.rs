//! Raw record normalization
//!
//! Store records arrive loosely shaped: optional fields, mixed-case
//! keywords, stray whitespace, unknown extra keys. Normalization maps them
//! into the fixed `Interview`/`Segment` shapes: unknown fields are dropped,
//! missing optional fields default, and only records missing something the
//! engine cannot work without (an id, a source ref) are rejected.

use reelmix_common::model::{Interview, Segment};
use reelmix_common::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Raw interview record as persisted
#[derive(Debug, Clone, Deserialize)]
pub struct RawInterviewRecord {
    pub id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Raw segment record as persisted
#[derive(Debug, Clone, Deserialize)]
pub struct RawSegmentRecord {
    pub id: Uuid,
    pub interview_id: Uuid,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub summary_text: Option<String>,
    #[serde(default)]
    pub timestamp_range: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Normalize a raw keyword list: trim, lowercase, drop empties, dedup
pub fn normalize_keywords(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Map a raw interview record into the fixed `Interview` shape
///
/// A missing source ref makes the interview unplayable, so the record is
/// rejected rather than defaulted.
pub fn normalize_interview(raw: RawInterviewRecord) -> Result<Interview> {
    let source_ref = raw
        .source_ref
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("interview {} has no source_ref", raw.id)))?;

    Ok(Interview {
        id: raw.id,
        display_name: raw.display_name.unwrap_or_default(),
        role: raw.role.unwrap_or_default(),
        source_ref,
        thumbnail_url: raw.thumbnail_url.unwrap_or_default(),
    })
}

/// Map a raw segment record into the fixed `Segment` shape
///
/// Everything defaults: a segment with no keywords is simply never
/// indexed, and a segment with no timestamp range plays with the default
/// duration from offset zero.
pub fn normalize_segment(raw: RawSegmentRecord) -> Segment {
    Segment {
        id: raw.id,
        interview_id: raw.interview_id,
        topic: raw.topic.unwrap_or_default(),
        summary_text: raw.summary_text.unwrap_or_default(),
        timestamp_range: raw.timestamp_range.unwrap_or_default(),
        keywords: normalize_keywords(&raw.keywords.unwrap_or_default()),
        thumbnail_url: raw.thumbnail_url.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_interview(source_ref: Option<&str>) -> RawInterviewRecord {
        RawInterviewRecord {
            id: Uuid::new_v4(),
            display_name: Some("Ella Baker".to_string()),
            role: None,
            source_ref: source_ref.map(|s| s.to_string()),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_interview_defaults_missing_fields() {
        let interview = normalize_interview(raw_interview(Some("vimeo:123456"))).unwrap();
        assert_eq!(interview.display_name, "Ella Baker");
        assert_eq!(interview.role, "");
        assert_eq!(interview.source_ref, "vimeo:123456");
        assert_eq!(interview.thumbnail_url, "");
    }

    #[test]
    fn test_interview_without_source_ref_rejected() {
        assert!(normalize_interview(raw_interview(None)).is_err());
        assert!(normalize_interview(raw_interview(Some("   "))).is_err());
    }

    #[test]
    fn test_keywords_lowercased_and_deduped() {
        let raw = vec![
            "Sit-Ins".to_string(),
            "  sit-ins ".to_string(),
            "GREENSBORO".to_string(),
            "".to_string(),
            "  ".to_string(),
        ];
        let keywords = normalize_keywords(&raw);
        assert_eq!(keywords.len(), 2);
        assert!(keywords.contains("sit-ins"));
        assert!(keywords.contains("greensboro"));
    }

    #[test]
    fn test_segment_defaults_everything_optional() {
        let raw = RawSegmentRecord {
            id: Uuid::new_v4(),
            interview_id: Uuid::new_v4(),
            topic: None,
            summary_text: None,
            timestamp_range: None,
            keywords: None,
            thumbnail_url: None,
        };
        let segment = normalize_segment(raw);
        assert_eq!(segment.topic, "");
        assert!(segment.keywords.is_empty());
        // No range at all still derives the default duration
        assert_eq!(
            segment.duration_secs(),
            reelmix_common::DEFAULT_CLIP_SECS
        );
    }

    #[test]
    fn test_unknown_raw_fields_are_dropped() {
        let json = r##"{
            "id": "7b1c9a54-5b86-4e2a-9b6f-97a41c2f1a11",
            "interview_id": "aa1c9a54-5b86-4e2a-9b6f-97a41c2f1a22",
            "topic": "Lunch counter protests",
            "keywords": ["Sit-Ins"],
            "legacy_editor_state": {"nodes": []},
            "color": "#fff"
        }"##;
        let raw: RawSegmentRecord = serde_json::from_str(json).unwrap();
        let segment = normalize_segment(raw);
        assert_eq!(segment.topic, "Lunch counter protests");
        assert!(segment.keywords.contains("sit-ins"));
    }
}
