//! Random-Access Reader Module
//!
//! Byte-exact reads of indexed members through a process-local file handle.
//!
//! ## Responsibilities
//! - Open the archive lazily, on the first read in a process
//! - Reopen when the handle was inherited across a fork
//! - Bound every read to the member's content range
//!
//! ## Concurrency
//! The handle sits behind a `Mutex`: seek+read is not atomic, so a
//! `MemberReader` holds the lock until it is dropped. The lock is never
//! waited on: a read that finds it held opens a dedicated file instead, so
//! overlapping readers on one thread cannot deadlock. Threads that read in
//! parallel are better served by separate handles (e.g. a cloned `TarDataset`).

mod handle;
mod member;

pub use handle::ArchiveHandle;
pub use member::MemberReader;
