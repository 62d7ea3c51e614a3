//! # tardataset
//!
//! Random-access iteration over members of an uncompressed tar archive, so a
//! dataset of millions of small files can live in one file:
//! - One header scan per open builds an in-memory index
//! - Byte-exact member reads through a lazily opened, per-process handle
//! - Pluggable membership filters and sample loaders
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TarDataset                            │
//! │             open / list / read / read_text / close           │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │ name / position                │ record
//!                ▼                                ▼
//!   ┌────────────────────────┐      ┌────────────────────────────┐
//!   │      ArchiveIndex      │      │       ArchiveHandle        │
//!   │ (built once, read-only)│      │ (lazy, per process, Mutex) │
//!   └───────────┬────────────┘      └─────────────┬──────────────┘
//!               │ scan once                        │ seek + bounded read
//!               ▼                                  ▼
//!   ┌────────────────────────┐      ┌────────────────────────────┐
//!   │     Header Scanner     │      │        MemberReader        │
//!   │  (512-byte blocks)     │      │  (exactly `size` bytes)    │
//!   └────────────────────────┘      └────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod header;
pub mod index;
pub mod reader;
pub mod dataset;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, MemberPredicate, DEFAULT_IMAGE_EXTENSIONS};
pub use dataset::{RawBytes, SampleLoader, TarDataset};
pub use error::{Result, TarError};
pub use index::{ArchiveIndex, ListEntry, MemberKey, MemberKind, MemberRecord};
pub use reader::{ArchiveHandle, MemberReader};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tardataset
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
