//! Process-local archive handle

use std::fs::File;
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::process;

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{Result, TarError};
use crate::index::MemberRecord;

use super::member::MemberReader;

/// Open archive file plus the process that opened it
#[derive(Debug)]
struct OpenArchive {
    file: BufReader<File>,
    owner_pid: u32,
}

/// Lazily opened, process-local handle to an archive file
///
/// Starts closed. The first `open_member` in a process opens the file; later
/// calls reuse it. A handle opened by another process (inherited through
/// `fork`) is discarded and reopened, never shared.
///
/// ## Overlapping Reads
/// A `MemberReader` holds the shared file until it is dropped. While it is
/// held, further `open_member` calls (from any thread, including the one
/// holding the reader) read through a dedicated file opened for that read
/// instead of waiting.
#[derive(Debug, Default)]
pub struct ArchiveHandle {
    slot: Mutex<Option<OpenArchive>>,
}

impl ArchiveHandle {
    /// Create a closed handle
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this process holds an open file for the archive
    pub fn is_open(&self) -> bool {
        match self.slot.try_lock() {
            Some(slot) => matches!(&*slot, Some(open) if open.owner_pid == process::id()),
            // held by a live reader
            None => true,
        }
    }

    /// Seek to `record` and return a reader bounded to its content.
    ///
    /// Uses the shared file when it is free; otherwise opens a dedicated one.
    pub fn open_member<'a>(
        &'a self,
        archive: &Path,
        record: &MemberRecord,
    ) -> Result<MemberReader<'a>> {
        if !record.is_file() {
            return Err(TarError::NotReadable {
                name: record.name.clone(),
                kind: record.kind,
            });
        }

        let Some(mut slot) = self.slot.try_lock() else {
            debug!(name = %record.name, "archive handle busy; reading through a dedicated file");
            let mut file = BufReader::new(open_archive(archive)?);
            file.seek(SeekFrom::Start(record.offset))?;
            return Ok(MemberReader::dedicated(file, record.size));
        };

        let pid = process::id();
        let reusable = matches!(slot.as_ref(), Some(open) if open.owner_pid == pid);
        if !reusable {
            if let Some(stale) = slot.take() {
                debug!(owner = stale.owner_pid, pid, "dropping archive handle from another process");
            }
            let file = open_archive(archive)?;
            debug!(path = %archive.display(), pid, "opened archive handle");
            *slot = Some(OpenArchive {
                file: BufReader::new(file),
                owner_pid: pid,
            });
        }

        let mut file = MutexGuard::try_map(slot, |slot| slot.as_mut().map(|open| &mut open.file))
            .map_err(|_| TarError::Io(io::Error::other("archive handle missing after open")))?;
        file.seek(SeekFrom::Start(record.offset))?;

        Ok(MemberReader::shared(file, record.size))
    }

    /// Release the file, if open. Safe to call repeatedly.
    ///
    /// Returns true if a file was closed. While a reader holds the file it
    /// stays open and this returns false.
    pub fn close(&self) -> bool {
        let Some(mut slot) = self.slot.try_lock() else {
            debug!("archive handle in use by a reader; left open");
            return false;
        };
        match slot.take() {
            Some(open) => {
                debug!(owner = open.owner_pid, "closed archive handle");
                true
            }
            None => false,
        }
    }
}

fn open_archive(archive: &Path) -> Result<File> {
    File::open(archive).map_err(|source| TarError::Open {
        path: archive.to_path_buf(),
        source,
    })
}
