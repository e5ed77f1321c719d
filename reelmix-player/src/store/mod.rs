//! Segment store access
//!
//! The engine consumes interviews and segments through the `SegmentStore`
//! trait and never writes back. `adapter` normalizes loosely-shaped raw
//! records into the fixed internal model; `sqlite` is the production
//! implementation over sqlx.

pub mod adapter;
pub mod sqlite;

use async_trait::async_trait;
use reelmix_common::model::{Interview, Segment};
use reelmix_common::Result;
use uuid::Uuid;

/// Read interface over the interview/segment document store
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// List every interview in the corpus
    async fn list_interviews(&self) -> Result<Vec<Interview>>;

    /// List all segments belonging to one interview
    async fn list_segments_of(&self, interview_id: Uuid) -> Result<Vec<Segment>>;
}

pub use sqlite::SqliteSegmentStore;
