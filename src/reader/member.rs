//! Bounded member reader

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};

use bytes::Bytes;
use parking_lot::MappedMutexGuard;

use crate::error::Result;

/// Where a reader's bytes come from
enum Source<'a> {
    /// The archive handle's file, locked for the reader's lifetime
    Shared(MappedMutexGuard<'a, BufReader<File>>),
    /// A file opened for this read alone
    Dedicated(BufReader<File>),
}

impl Source<'_> {
    fn file(&mut self) -> &mut BufReader<File> {
        match self {
            Source::Shared(file) => &mut **file,
            Source::Dedicated(file) => file,
        }
    }
}

/// Reads exactly one member's content, never past its end
pub struct MemberReader<'a> {
    source: Source<'a>,
    size: u64,
    remaining: u64,
}

impl<'a> MemberReader<'a> {
    /// `file` must already be positioned at the member's content
    pub(super) fn shared(file: MappedMutexGuard<'a, BufReader<File>>, size: u64) -> Self {
        Self::with_source(Source::Shared(file), size)
    }

    /// `file` must already be positioned at the member's content
    pub(super) fn dedicated(file: BufReader<File>, size: u64) -> Self {
        Self::with_source(Source::Dedicated(file), size)
    }

    fn with_source(source: Source<'a>, size: u64) -> Self {
        Self {
            source,
            size,
            remaining: size,
        }
    }

    /// True if this reader holds the archive handle's shared file
    pub fn is_shared(&self) -> bool {
        matches!(self.source, Source::Shared(_))
    }

    /// Content length of the member
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read the rest of the member into a vector
    pub fn into_vec(mut self) -> Result<Vec<u8>> {
        let mut content = Vec::with_capacity(self.remaining as usize);
        self.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read the rest of the member into a `Bytes` buffer
    pub fn into_bytes(self) -> Result<Bytes> {
        self.into_vec().map(Bytes::from)
    }
}

impl Read for MemberReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.source.file().read(&mut buf[..max])?;
        if n == 0 {
            // archive shrank after it was indexed
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("archive ended with {} member bytes unread", self.remaining),
            ));
        }

        self.remaining -= n as u64;
        Ok(n)
    }
}

impl fmt::Debug for MemberReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberReader")
            .field("size", &self.size)
            .field("remaining", &self.remaining)
            .field("shared", &self.is_shared())
            .finish()
    }
}
