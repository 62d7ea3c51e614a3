//! Header Scanner Module
//!
//! Decodes fixed-size tar header blocks into member metadata. Knows nothing
//! about files or cursors: callers hand it one 512-byte block at a time (plus
//! the content of extension headers) and advance their own position.
//!
//! ## Responsibilities
//! - Validate the header checksum
//! - Decode name, size and type flag (ustar prefix, base-256 sizes)
//! - Classify GNU long-name and PAX extension headers
//! - Recognize the all-zero end-of-archive block
//!
//! ## Block Layout (ustar)
//! ```text
//! ┌──────────────┬──────────┬──────────┬──────────┬────────────┐
//! │ name (100)   │ mode (8) │ uid (8)  │ gid (8)  │ size (12)  │
//! ├──────────────┼──────────┼──────────┼──────────┴────────────┤
//! │ mtime (12)   │ cksum(8) │ type (1) │ linkname (100)        │
//! ├──────────────┴──────────┴──────────┴───────────────────────┤
//! │ magic (6) │ version (2) │ uname/gname (64) │ dev (16)       │
//! ├────────────────────────────────────────────────────────────┤
//! │ prefix (155) │ padding (12)                                 │
//! └────────────────────────────────────────────────────────────┘
//! followed by ceil(size / 512) content blocks
//! ```

mod block;
mod checksum;
mod extension;

pub use block::{is_zero_block, parse_header, HeaderBlock, HeaderClass};
pub use checksum::compute_checksum;
pub use extension::{gnu_long_name, pax_overrides, PaxOverrides};

// =============================================================================
// Shared Constants
// =============================================================================

/// Size of every header and content block
pub const BLOCK_SIZE: u64 = 512;

/// `BLOCK_SIZE` as a buffer length
pub const BLOCK_LEN: usize = BLOCK_SIZE as usize;

/// Byte offset of the type flag within a header block
pub(crate) const TYPEFLAG_OFFSET: usize = 156;
