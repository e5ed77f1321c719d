//! # Reelmix Player Library (reelmix-player)
//!
//! Keyword-indexed clip retrieval and playback coordination engine.
//!
//! **Purpose:** Turn a corpus of timestamped interview clips into shuffled
//! cross-interview playlists: build and cache an inverted keyword index,
//! recommend related keywords, assemble playlists progressively, drive an
//! external media widget through clip boundaries, and map the whole queue
//! onto one proportional timeline.
//!
//! **Architecture:** Segment store adapter → keyword index cache →
//! playlist assembler → clip playback controller → timeline aggregator,
//! with an HTTP/SSE control surface on top.

pub mod api;
pub mod error;
pub mod index;
pub mod player;
pub mod playlist;
pub mod related;
pub mod store;
pub mod timeline;

pub use error::{Error, Result};
