//! Error types for DDFF
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::block::StreamId;

/// Result type alias using DdffError
pub type Result<T> = std::result::Result<T, DdffError>;

/// Unified error type for DDFF operations
#[derive(Debug, Error)]
pub enum DdffError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Integrity Errors
    // -------------------------------------------------------------------------
    #[error("Truncated file: expected {expected} bytes, found {found}")]
    TruncatedFile { expected: u64, found: u64 },

    #[error("Corrupt block at offset {offset}: {reason}")]
    CorruptBlock { offset: u64, reason: String },

    #[error("Corrupt stream {stream_id}: {reason}")]
    CorruptStream { stream_id: StreamId, reason: String },

    // -------------------------------------------------------------------------
    // Stream Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Non-contiguous stream id: requested {requested}, next free id is {next}")]
    NonContiguousStreamId { requested: usize, next: usize },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Unknown {kind}: {key}")]
    KeyNotFound { kind: &'static str, key: String },

    // -------------------------------------------------------------------------
    // Schema / Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration / Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Container is read-only")]
    ReadOnly,

    #[error("Container is closed")]
    Closed,
}

impl DdffError {
    /// Shorthand for a failed lookup of `key` in the namespace `kind`
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        DdffError::KeyNotFound {
            kind,
            key: key.to_string(),
        }
    }
}
