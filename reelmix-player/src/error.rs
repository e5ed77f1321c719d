//! Error types for reelmix-player
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Widget failures and bad clip boundaries are deliberately
//! absent here: those are folded into the controller's `Skipping` state
//! and never surface as errors.

use thiserror::Error;

/// Result type for reelmix-player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the reelmix-player module
#[derive(Error, Debug)]
pub enum Error {
    /// Shared error from reelmix-common (store, database, config, IO)
    #[error(transparent)]
    Common(#[from] reelmix_common::Error),

    /// Index rebuild failed with no usable cached index
    ///
    /// Distinct from an empty query result: the caller may retry.
    #[error("Index unavailable: {0}")]
    Index(String),

    /// Playlist assembly errors
    #[error("Playlist error: {0}")]
    Playlist(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}
