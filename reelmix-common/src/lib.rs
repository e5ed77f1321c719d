//! # Reelmix Common Library
//!
//! Shared code for the reelmix services including:
//! - Interview and segment data model
//! - Error types
//! - Timestamp range parsing and clip duration derivation
//! - Event types (PlayerEvent enum)
//! - Configuration loading
//! - Clock abstraction for TTL and deadline logic
//! - Database schema initialization

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod time;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use time::{clip_duration_secs, parse_timestamp_range, TimestampRange, DEFAULT_CLIP_SECS};
