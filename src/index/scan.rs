//! Archive scan
//!
//! Walks the header chain from the start of the archive, skipping content
//! blocks with seeks so the cost is proportional to member count.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, TarError};
use crate::header::{
    gnu_long_name, is_zero_block, pax_overrides, parse_header, HeaderClass, PaxOverrides,
    BLOCK_LEN, BLOCK_SIZE,
};

use super::record::{normalize_name, MemberKind, MemberRecord};

/// Upper bound for GNU long-name and PAX header content
const MAX_EXTENSION_SIZE: u64 = 1024 * 1024;

/// Raw scan output: every member in header order, duplicates included
#[derive(Debug, Clone)]
pub struct ArchiveScan {
    pub records: Vec<MemberRecord>,
    pub archive_len: u64,
}

/// Extension headers waiting for the member they describe
#[derive(Debug, Default)]
struct PendingExtensions {
    long_name: Option<Vec<u8>>,
    pax: PaxOverrides,
}

/// Outcome of reading one block
enum BlockRead {
    Full,
    Short(usize),
    Eof,
}

/// Scan the archive at `path`
pub fn scan_archive(path: &Path) -> Result<ArchiveScan> {
    let file = File::open(path).map_err(|source| TarError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let archive_len = file.metadata()?.len();

    scan_reader(file, archive_len)
}

/// Scan an archive of `archive_len` bytes from the start of `reader`
pub fn scan_reader<R: Read + Seek>(reader: R, archive_len: u64) -> Result<ArchiveScan> {
    let mut reader = BufReader::new(reader);
    let mut records = Vec::new();
    let mut pending = PendingExtensions::default();
    let mut block = [0u8; BLOCK_LEN];
    let mut cursor = 0u64;

    loop {
        let header_offset = cursor;
        match read_block(&mut reader, &mut block)? {
            BlockRead::Full => {}
            BlockRead::Eof => break,
            BlockRead::Short(bytes) => {
                warn!(offset = header_offset, bytes, "ignoring short trailing block");
                break;
            }
        }
        cursor += BLOCK_SIZE;

        let Some(header) = parse_header(&block, header_offset)? else {
            check_end_marker(&mut reader, &mut block, header_offset)?;
            break;
        };

        let content_offset = cursor;

        let kind = match header.class {
            HeaderClass::Member(kind) => kind,
            HeaderClass::GnuLongName | HeaderClass::PaxLocal => {
                let content = read_extension(&mut reader, header.size, header_offset, archive_len)?;
                cursor += header.padded_size;

                if header.class == HeaderClass::GnuLongName {
                    pending.long_name = Some(gnu_long_name(&content));
                } else {
                    pending.pax = pax_overrides(&content, header_offset)?;
                }
                continue;
            }
            HeaderClass::GnuLongLink | HeaderClass::PaxGlobal => {
                debug!(offset = header_offset, class = ?header.class, "skipping extension header");
                skip_content(&mut reader, content_offset, header.size, header_offset, archive_len)?;
                cursor += header.padded_size;
                continue;
            }
        };

        let pax = std::mem::take(&mut pending.pax);
        let long_name = pending.long_name.take();
        let raw_name = pax.path.or(long_name).unwrap_or(header.path);
        let size = pax.size.unwrap_or(header.size);

        if std::str::from_utf8(&raw_name).is_err() {
            warn!(offset = header_offset, "member name is not valid UTF-8");
        }

        let padded = skip_content(&mut reader, content_offset, size, header_offset, archive_len)?;
        cursor += padded;

        let (offset, size) = match kind {
            MemberKind::Directory => (0, 0),
            _ => (content_offset, size),
        };

        records.push(MemberRecord {
            name: normalize_name(&raw_name),
            kind,
            offset,
            size,
            header_offset,
        });
    }

    Ok(ArchiveScan {
        records,
        archive_len,
    })
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Fill `block`, tolerating EOF
fn read_block<R: Read>(reader: &mut R, block: &mut [u8; BLOCK_LEN]) -> Result<BlockRead> {
    let mut filled = 0;
    while filled < BLOCK_LEN {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(match filled {
        0 => BlockRead::Eof,
        BLOCK_LEN => BlockRead::Full,
        n => BlockRead::Short(n),
    })
}

/// Look at the block after a zero block; anything but a second zero block or
/// EOF is logged and ignored.
fn check_end_marker<R: Read>(
    reader: &mut R,
    block: &mut [u8; BLOCK_LEN],
    zero_offset: u64,
) -> Result<()> {
    if let BlockRead::Full = read_block(reader, block)? {
        if !is_zero_block(block) {
            warn!(
                offset = zero_offset,
                "data follows a lone zero block; treating it as end of archive"
            );
        }
    }
    Ok(())
}

/// Ensure `size` content bytes at `content_offset` fit in the archive
fn check_bounds(content_offset: u64, size: u64, header_offset: u64, archive_len: u64) -> Result<()> {
    match content_offset.checked_add(size) {
        Some(end) if end <= archive_len => Ok(()),
        _ => Err(TarError::malformed(
            header_offset,
            format!(
                "content of {} bytes at offset {} extends past end of archive ({} bytes)",
                size, content_offset, archive_len
            ),
        )),
    }
}

/// Seek past `size` bytes of content plus padding; returns the padded length
fn skip_content<R: Seek>(
    reader: &mut BufReader<R>,
    content_offset: u64,
    size: u64,
    header_offset: u64,
    archive_len: u64,
) -> Result<u64> {
    check_bounds(content_offset, size, header_offset, archive_len)?;

    let padded = size
        .checked_next_multiple_of(BLOCK_SIZE)
        .ok_or_else(|| TarError::malformed(header_offset, format!("size {} overflows", size)))?;
    let distance = i64::try_from(padded)
        .map_err(|_| TarError::malformed(header_offset, format!("size {} overflows", size)))?;

    reader.seek_relative(distance)?;
    Ok(padded)
}

/// Read the content of an extension header and consume its padding
fn read_extension<R: Read>(
    reader: &mut R,
    size: u64,
    header_offset: u64,
    archive_len: u64,
) -> Result<Vec<u8>> {
    check_bounds(header_offset + BLOCK_SIZE, size, header_offset, archive_len)?;
    if size > MAX_EXTENSION_SIZE {
        return Err(TarError::malformed(
            header_offset,
            format!("extension header of {} bytes exceeds {} bytes", size, MAX_EXTENSION_SIZE),
        ));
    }

    let padded = size.next_multiple_of(BLOCK_SIZE) as usize;
    let mut content = vec![0u8; padded];
    reader.read_exact(&mut content).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            TarError::malformed(header_offset, "extension header content is truncated")
        }
        _ => TarError::Io(e),
    })?;

    content.truncate(size as usize);
    Ok(content)
}
