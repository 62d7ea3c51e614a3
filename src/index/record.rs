//! Member records

use serde::{Deserialize, Serialize};

/// Kind of an archive member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    RegularFile,
    Directory,
    /// Links, devices, FIFOs, sparse files
    Other,
}

/// One archive member, derived from its header alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Normalized path, unique within an index
    pub name: String,
    pub kind: MemberKind,
    /// Absolute position of the content in the archive file (0 for directories)
    pub offset: u64,
    /// Content length in bytes (0 for directories)
    pub size: u64,
    /// Position of the member's own header block
    pub header_offset: u64,
}

impl MemberRecord {
    pub fn is_file(&self) -> bool {
        self.kind == MemberKind::RegularFile
    }

    pub fn is_dir(&self) -> bool {
        self.kind == MemberKind::Directory
    }

    /// First byte past the member's content
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Normalize a raw member path: strip leading `./` and trailing `/`.
///
/// The archive root (`./` or `.`) becomes `"."`. Invalid UTF-8 is replaced
/// lossily.
pub fn normalize_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    let mut trimmed: &str = &name;

    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    let trimmed = trimmed.trim_end_matches('/');

    if trimmed.is_empty() || trimmed == "." {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

