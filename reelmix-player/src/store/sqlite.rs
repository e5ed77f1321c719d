//! SQLite-backed segment store
//!
//! Read-only SELECTs over the `interviews` and `segments` tables. Rows are
//! fetched as raw tuples, lifted into raw records, and normalized through
//! the adapter so malformed rows degrade instead of failing the listing.

use crate::store::adapter::{
    normalize_interview, normalize_segment, RawInterviewRecord, RawSegmentRecord,
};
use crate::store::SegmentStore;
use async_trait::async_trait;
use reelmix_common::model::{Interview, Segment};
use reelmix_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

/// Segment store over a SQLite database
#[derive(Clone)]
pub struct SqliteSegmentStore {
    db: SqlitePool,
}

impl SqliteSegmentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn parse_id(raw: &str, table: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| Error::Store(format!("{} row has invalid uuid {:?}", table, raw)))
}

/// Parse the JSON keyword column; a malformed value degrades to no keywords
fn parse_keyword_column(id: Uuid, raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(keywords) => Some(keywords),
        Err(e) => {
            warn!("Segment {} has malformed keywords column: {}", id, e);
            None
        }
    }
}

#[async_trait]
impl SegmentStore for SqliteSegmentStore {
    async fn list_interviews(&self) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
            r#"
            SELECT id, display_name, role, source_ref, thumbnail_url
            FROM interviews
            ORDER BY display_name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut interviews = Vec::with_capacity(rows.len());
        for row in rows {
            let raw = RawInterviewRecord {
                id: parse_id(&row.0, "interviews")?,
                display_name: Some(row.1),
                role: Some(row.2),
                source_ref: Some(row.3),
                thumbnail_url: Some(row.4),
            };
            match normalize_interview(raw) {
                Ok(interview) => interviews.push(interview),
                // An unplayable interview is dropped from the corpus, not fatal
                Err(e) => warn!("Skipping interview row: {}", e),
            }
        }

        debug!("Listed {} interviews", interviews.len());
        Ok(interviews)
    }

    async fn list_segments_of(&self, interview_id: Uuid) -> Result<Vec<Segment>> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String, String)>(
            r#"
            SELECT id, topic, summary_text, timestamp_range, keywords, thumbnail_url
            FROM segments
            WHERE interview_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(interview_id.to_string())
        .fetch_all(&self.db)
        .await?;

        let mut segments = Vec::with_capacity(rows.len());
        for row in rows {
            let id = parse_id(&row.0, "segments")?;
            let raw = RawSegmentRecord {
                id,
                interview_id,
                topic: Some(row.1),
                summary_text: Some(row.2),
                timestamp_range: Some(row.3),
                keywords: parse_keyword_column(id, &row.4),
                thumbnail_url: Some(row.5),
            };
            segments.push(normalize_segment(raw));
        }

        debug!(
            "Listed {} segments for interview {}",
            segments.len(),
            interview_id
        );
        Ok(segments)
    }
}
