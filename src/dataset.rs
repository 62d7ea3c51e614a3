//! Dataset Module
//!
//! The surface consumed by dataset-assembly code: open an archive once, then
//! list samples and read members by name or position.
//!
//! ## Worker Model
//! ```text
//!   parent                         worker N
//!   ──────                         ────────
//!   TarDataset::open(path)   ──►   clone / from_bytes / open(path)
//!     index built once               same index, handle closed
//!     handle closed                  first read opens its own handle
//! ```

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, TarError};
use crate::index::{ArchiveIndex, ListEntry, MemberKey, MemberRecord};
use crate::reader::{ArchiveHandle, MemberReader};

/// Turns a member into a sample
///
/// Implemented for any `Fn(&TarDataset, &MemberRecord) -> Result<T>`, so
/// closures can be passed directly.
pub trait SampleLoader {
    type Sample;

    fn load(&self, dataset: &TarDataset, record: &MemberRecord) -> Result<Self::Sample>;
}

impl<F, T> SampleLoader for F
where
    F: Fn(&TarDataset, &MemberRecord) -> Result<T>,
{
    type Sample = T;

    fn load(&self, dataset: &TarDataset, record: &MemberRecord) -> Result<T> {
        self(dataset, record)
    }
}

/// Loader that returns the member's raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytes;

impl SampleLoader for RawBytes {
    type Sample = Bytes;

    fn load(&self, dataset: &TarDataset, record: &MemberRecord) -> Result<Bytes> {
        dataset.read_record(record)?.into_bytes()
    }
}

/// An indexed archive plus a lazily opened, process-local handle
///
/// Serializing or cloning carries the index only; the copy starts with a
/// closed handle.
#[derive(Debug, Serialize, Deserialize)]
pub struct TarDataset {
    index: ArchiveIndex,
    #[serde(skip)]
    handle: ArchiveHandle,
}

impl Clone for TarDataset {
    fn clone(&self) -> Self {
        Self::from_index(self.index.clone())
    }
}

impl TarDataset {
    /// Index the archive at `path`. No file handle is kept open afterwards.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let index = ArchiveIndex::build(path, config)?;
        Ok(Self::from_index(index))
    }

    /// Wrap an existing index with a closed handle
    pub fn from_index(index: ArchiveIndex) -> Self {
        Self {
            index,
            handle: ArchiveHandle::new(),
        }
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Samples as `(position, name, kind)`, in stable order
    pub fn list(&self) -> impl Iterator<Item = ListEntry<'_>> + '_ {
        self.index.list()
    }

    /// Record for a name or sample position
    pub fn record<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<&MemberRecord> {
        self.index.resolve(key.into())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Stream a member's content
    pub fn read<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<MemberReader<'_>> {
        let record = self.record(key)?;
        self.read_record(record)
    }

    /// Stream the content of a record taken from this dataset's index
    pub fn read_record(&self, record: &MemberRecord) -> Result<MemberReader<'_>> {
        self.handle.open_member(self.index.path(), record)
    }

    /// Read a member's content into memory
    pub fn read_bytes<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Bytes> {
        self.read(key)?.into_bytes()
    }

    /// Read a member as UTF-8 text. Invalid sequences are an error.
    pub fn read_text<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<String> {
        let record = self.record(key)?;
        let content = self.read_record(record)?.into_vec()?;

        String::from_utf8(content).map_err(|e| TarError::Decode {
            name: record.name.clone(),
            source: e.utf8_error(),
        })
    }

    // =========================================================================
    // Samples
    // =========================================================================

    /// Load the sample at `position` with `loader`
    pub fn load<L: SampleLoader>(&self, position: usize, loader: &L) -> Result<L::Sample> {
        let record = self.index.resolve(MemberKey::Position(position))?;
        loader.load(self, record)
    }

    /// Load every sample in order
    pub fn iter_loaded<'a, L: SampleLoader>(
        &'a self,
        loader: &'a L,
    ) -> impl Iterator<Item = Result<L::Sample>> + 'a {
        self.index.records().map(move |record| loader.load(self, record))
    }

    // =========================================================================
    // Handle Lifecycle
    // =========================================================================

    /// True if this process has opened the archive for reading
    pub fn is_handle_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Release this process's handle; the next read reopens it.
    ///
    /// A handle still held by a live reader is left open.
    pub fn close(&self) {
        self.handle.close();
    }

    // =========================================================================
    // Shipping
    // =========================================================================

    /// Encode for transfer to a worker process (index only)
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TarError::Serialization(e.to_string()))
    }

    /// Decode a dataset produced by `to_bytes`; the handle starts closed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let dataset: Self =
            bincode::deserialize(bytes).map_err(|e| TarError::Serialization(e.to_string()))?;
        dataset.index.check_positions()?;
        Ok(dataset)
    }
}
