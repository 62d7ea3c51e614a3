//! Archive Indexer Module
//!
//! Drives the header scanner across an archive exactly once and keeps the
//! result in memory.
//!
//! ## Responsibilities
//! - Compute each member's content offset and length without reading content
//! - Resolve name collisions (last header wins)
//! - Apply the membership filter to build the sample list
//! - Serve O(1) lookups by name or sample position
//!
//! ## Layout In Memory
//! ```text
//! members:  [ rec0 | rec1 | rec2 | rec3 | ... ]   every member, header order
//!              ▲      ▲             ▲
//! by_name:  "red" → 0, "red/a.png" → 1, ...
//! samples:  [ 1, 3, ... ]                          positions passing the filter
//! ```

mod archive;
mod record;
mod scan;

pub use archive::{ArchiveIndex, ListEntry, MemberKey};
pub use record::{normalize_name, MemberKind, MemberRecord};
pub use scan::{scan_archive, scan_reader, ArchiveScan};
