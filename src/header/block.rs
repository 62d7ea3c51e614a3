//! Header block decoding

use tar::{EntryType, Header};

use crate::error::{Result, TarError};
use crate::index::MemberKind;

use super::checksum::{checksum_matches, compute_checksum};
use super::{BLOCK_LEN, BLOCK_SIZE, TYPEFLAG_OFFSET};

/// What a header block introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderClass {
    /// An archive member (file, directory, link, device...)
    Member(MemberKind),
    /// GNU `L`: content is the name of the next member
    GnuLongName,
    /// GNU `K`: content is the link target of the next member
    GnuLongLink,
    /// PAX `x`: records for the next member
    PaxLocal,
    /// PAX `g`: records for all following members
    PaxGlobal,
}

/// A decoded header block
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    /// Raw path bytes (ustar prefix already joined)
    pub path: Vec<u8>,
    pub class: HeaderClass,
    /// Content length declared in the header
    pub size: u64,
    /// Content length rounded up to whole blocks
    pub padded_size: u64,
}

impl HeaderBlock {
    /// True for headers that describe the next member rather than themselves
    pub fn is_extension(&self) -> bool {
        !matches!(self.class, HeaderClass::Member(_))
    }
}

/// True if every byte of the block is zero (end-of-archive marker)
pub fn is_zero_block(block: &[u8; BLOCK_LEN]) -> bool {
    block.iter().all(|&b| b == 0)
}

/// Decode one header block located at `offset` in the archive.
///
/// Returns `Ok(None)` for an all-zero block. Any checksum or field error is
/// reported as `MalformedHeader`.
pub fn parse_header(block: &[u8; BLOCK_LEN], offset: u64) -> Result<Option<HeaderBlock>> {
    if is_zero_block(block) {
        return Ok(None);
    }

    let header = Header::from_byte_slice(block);

    let stored = header
        .cksum()
        .map_err(|e| TarError::malformed(offset, format!("unreadable checksum field: {}", e)))?;
    if !checksum_matches(block, stored) {
        return Err(TarError::malformed(
            offset,
            format!(
                "checksum mismatch: stored {}, computed {}",
                stored,
                compute_checksum(block)
            ),
        ));
    }

    let size = header
        .entry_size()
        .map_err(|e| TarError::malformed(offset, format!("unreadable size field: {}", e)))?;
    let padded_size = size
        .checked_next_multiple_of(BLOCK_SIZE)
        .ok_or_else(|| TarError::malformed(offset, format!("size {} overflows", size)))?;

    let path = header.path_bytes().into_owned();

    let class = match header.entry_type() {
        EntryType::GNULongName => HeaderClass::GnuLongName,
        EntryType::GNULongLink => HeaderClass::GnuLongLink,
        EntryType::XHeader => HeaderClass::PaxLocal,
        EntryType::XGlobalHeader => HeaderClass::PaxGlobal,
        EntryType::Directory => HeaderClass::Member(MemberKind::Directory),
        EntryType::Regular | EntryType::Continuous => {
            // pre-POSIX archives mark directories with a NUL type and a trailing slash
            if block[TYPEFLAG_OFFSET] == 0 && path.ends_with(b"/") {
                HeaderClass::Member(MemberKind::Directory)
            } else {
                HeaderClass::Member(MemberKind::RegularFile)
            }
        }
        _ => HeaderClass::Member(MemberKind::Other),
    };

    Ok(Some(HeaderBlock {
        path,
        class,
        size,
        padded_size,
    }))
}
