//! Archive Index
//!
//! Immutable in-memory directory of an archive, built once per open.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, TarError};

use super::record::{normalize_name, MemberKind, MemberRecord};
use super::scan::{scan_archive, ArchiveScan};

/// Address of a member: by name (any member) or by sample position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKey<'a> {
    Name(&'a str),
    Position(usize),
}

impl<'a> From<&'a str> for MemberKey<'a> {
    fn from(name: &'a str) -> Self {
        MemberKey::Name(name)
    }
}

impl<'a> From<&'a String> for MemberKey<'a> {
    fn from(name: &'a String) -> Self {
        MemberKey::Name(name.as_str())
    }
}

impl From<usize> for MemberKey<'_> {
    fn from(position: usize) -> Self {
        MemberKey::Position(position)
    }
}

impl fmt::Display for MemberKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Name(name) => write!(f, "{}", name),
            MemberKey::Position(position) => write!(f, "#{}", position),
        }
    }
}

/// One row of `ArchiveIndex::list`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry<'a> {
    pub position: usize,
    pub name: &'a str,
    pub kind: MemberKind,
}

/// In-memory index of a tar archive
///
/// ## Ordering
/// `members` keeps header order (or name order with `sort_by_name`). When a
/// name appears twice, the record stays at the position of the first
/// occurrence but carries the later header's kind, offset and size.
///
/// ## Sharing
/// Read-only after construction. Workers either clone it, ship it with
/// `to_bytes`/`from_bytes`, or rebuild it from the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveIndex {
    /// Path the archive was indexed from
    path: PathBuf,
    /// Archive length at index time
    archive_len: u64,
    /// Every member, unique by name
    members: Vec<MemberRecord>,
    /// Name → position in `members`
    by_name: HashMap<String, usize>,
    /// Positions in `members` that passed the filter
    samples: Vec<usize>,
}

impl ArchiveIndex {
    /// Scan the archive at `path` and build an index filtered by `config`.
    ///
    /// Fails atomically: a malformed header anywhere aborts the build.
    pub fn build(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref();
        let scan = scan_archive(path)?;
        Ok(Self::from_scan(path, scan, config))
    }

    /// Build an index from already scanned records
    pub fn from_scan(path: &Path, scan: ArchiveScan, config: &Config) -> Self {
        let ArchiveScan {
            records,
            archive_len,
        } = scan;
        let header_count = records.len();

        let mut members: Vec<MemberRecord> = Vec::with_capacity(header_count);
        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(header_count);

        for record in records {
            match by_name.get(&record.name) {
                Some(&position) => {
                    if record.name.contains(char::REPLACEMENT_CHARACTER) {
                        // distinct non-UTF-8 raw names can decode to the same string
                        warn!(
                            name = %record.name,
                            superseded = members[position].header_offset,
                            by = record.header_offset,
                            "lossily decoded member name repeated; earlier member unreachable"
                        );
                    } else {
                        debug!(
                            name = %record.name,
                            superseded = members[position].header_offset,
                            by = record.header_offset,
                            "member name repeated; keeping the later header"
                        );
                    }
                    members[position] = record;
                }
                None => {
                    by_name.insert(record.name.clone(), members.len());
                    members.push(record);
                }
            }
        }

        if config.sort_by_name {
            members.sort_by(|a, b| a.name.cmp(&b.name));
            by_name = members
                .iter()
                .enumerate()
                .map(|(position, record)| (record.name.clone(), position))
                .collect();
        }

        let samples: Vec<usize> = members
            .iter()
            .enumerate()
            .filter(|(_, record)| config.matches(record))
            .map(|(position, _)| position)
            .collect();

        info!(
            path = %path.display(),
            archive_len,
            headers = header_count,
            members = members.len(),
            samples = samples.len(),
            "indexed archive"
        );

        Self {
            path: path.to_path_buf(),
            archive_len,
            members,
            by_name,
            samples,
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Path of the indexed archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archive length in bytes when it was indexed
    pub fn archive_len(&self) -> u64 {
        self.archive_len
    }

    /// Number of samples (members that passed the filter)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of distinct members in the archive, filtered or not
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Sample at `position`
    pub fn get(&self, position: usize) -> Option<&MemberRecord> {
        self.samples
            .get(position)
            .map(|&member| &self.members[member])
    }

    /// Any member by name; the name is normalized first
    pub fn lookup(&self, name: &str) -> Option<&MemberRecord> {
        let position = match self.by_name.get(name) {
            Some(&position) => position,
            None => *self.by_name.get(&normalize_name(name.as_bytes()))?,
        };
        Some(&self.members[position])
    }

    /// Resolve a key, failing with `NotFound`
    pub fn resolve(&self, key: MemberKey<'_>) -> Result<&MemberRecord> {
        let record = match key {
            MemberKey::Name(name) => self.lookup(name),
            MemberKey::Position(position) => self.get(position),
        };
        record.ok_or_else(|| TarError::NotFound(key.to_string()))
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Samples in order
    pub fn records(&self) -> impl Iterator<Item = &MemberRecord> + '_ {
        self.samples.iter().map(move |&member| &self.members[member])
    }

    /// Every member in order, including those the filter rejected
    pub fn members(&self) -> impl Iterator<Item = &MemberRecord> + '_ {
        self.members.iter()
    }

    /// `(position, name, kind)` for each sample
    pub fn list(&self) -> impl Iterator<Item = ListEntry<'_>> + '_ {
        self.records()
            .enumerate()
            .map(|(position, record)| ListEntry {
                position,
                name: &record.name,
                kind: record.kind,
            })
    }

    // =========================================================================
    // Shipping
    // =========================================================================

    /// Encode the index for transfer to another process
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TarError::Serialization(e.to_string()))
    }

    /// Decode an index produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let index: Self =
            bincode::deserialize(bytes).map_err(|e| TarError::Serialization(e.to_string()))?;
        index.check_positions()?;
        Ok(index)
    }

    /// Reject decoded indexes whose positions point outside `members`
    pub(crate) fn check_positions(&self) -> Result<()> {
        let count = self.members.len();
        if let Some(&bad) = self.samples.iter().find(|&&member| member >= count) {
            return Err(TarError::Serialization(format!(
                "sample refers to member {} of {}",
                bad, count
            )));
        }
        if let Some((name, &bad)) = self.by_name.iter().find(|&(_, &member)| member >= count) {
            return Err(TarError::Serialization(format!(
                "name {:?} refers to member {} of {}",
                name, bad, count
            )));
        }
        Ok(())
    }
}
