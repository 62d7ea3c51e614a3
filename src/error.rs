//! Error types for tardataset
//!
//! Provides a unified error type for indexing and reading archives.

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::index::MemberKind;

/// Result type alias using TarError
pub type Result<T> = std::result::Result<T, TarError>;

/// Unified error type for tardataset operations
#[derive(Debug, Error)]
pub enum TarError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Indexing Errors
    // -------------------------------------------------------------------------
    /// Header block at `offset` failed checksum or field validation.
    /// Fatal for the whole index build.
    #[error("Malformed tar header at offset {offset}: {reason}")]
    MalformedHeader { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Lookup / Read Errors
    // -------------------------------------------------------------------------
    #[error("Member not found: {0}")]
    NotFound(String),

    #[error("Member {name} is not readable (kind: {kind:?})")]
    NotReadable { name: String, kind: MemberKind },

    #[error("Member {name} is not valid UTF-8: {source}")]
    Decode {
        name: String,
        #[source]
        source: Utf8Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TarError {
    pub(crate) fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        TarError::MalformedHeader {
            offset,
            reason: reason.into(),
        }
    }
}
