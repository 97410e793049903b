//! Capability trait definitions
//!
//! The seam between a storage engine and its file layer. The in-memory
//! implementations live in this crate; a disk-backed layer can implement
//! the same traits and be swapped in by the host without touching callers.

use std::io::{IoSlice, IoSliceMut, Read, Write};

use crate::error::Result;

/// Name-level file store operations.
///
/// Implementations must be usable as `Arc<dyn FileStore>`. Missing files
/// are not errors on the query paths: `exists` answers false, `size`
/// answers 0, and `delete` succeeds trivially.
pub trait FileStore: Send + Sync {
    /// Open the file at `name`, creating it if absent. Opening an existing
    /// file rewinds its cursor to 0.
    fn open(&self, name: &str) -> Result<Box<dyn RandomAccessFile>>;

    /// Create the file at `name`, replacing any previous file there.
    fn create(&self, name: &str) -> Result<Box<dyn RandomAccessFile>>;

    /// Check whether a file is registered under `name`.
    fn exists(&self, name: &str) -> bool;

    /// Logical size of the file at `name`; 0 when absent.
    fn size(&self, name: &str) -> u64;

    /// Delete the file at `name`. Reports success even when absent.
    fn delete(&self, name: &str) -> bool;

    /// Move a file between names without copying its contents.
    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Release all file resources and clear the store.
    fn dispose(&self);
}

/// Random-access file operations over a cursor and a logical size.
pub trait RandomAccessFile: Send + Sync {
    /// Read from the cursor into `dst`; always produces `dst.len()` bytes,
    /// zero-filling past the logical size.
    fn read(&self, dst: &mut [u8]) -> Result<usize>;

    /// Write `src` at the cursor, extending the file as needed.
    fn write(&self, src: &[u8]) -> Result<usize>;

    /// Read at `offset` without moving the cursor.
    fn read_at(&self, dst: &mut [u8], offset: u64) -> Result<usize>;

    /// Write at `offset` without moving the cursor.
    fn write_at(&self, src: &[u8], offset: u64) -> Result<usize>;

    /// Current cursor position.
    fn position(&self) -> u64;

    /// Move the cursor; positions past the logical size are legal.
    fn seek(&self, pos: u64);

    /// Logical size in bytes.
    fn size(&self) -> u64;

    /// Set the logical size without reallocating backing storage.
    fn truncate(&self, new_size: u64);

    /// Flush buffered state to durable storage; `metadata` asks for file
    /// metadata to be flushed too.
    fn force(&self, metadata: bool) -> Result<()>;

    /// Acquire the advisory lock. `None` means it is currently held;
    /// retry later rather than treating the miss as an error.
    fn lock(&self, shared: bool) -> Result<Option<Box<dyn AdvisoryLock>>>;

    /// Acquire the advisory lock, erroring when it is already held.
    fn try_lock(&self, shared: bool) -> Result<Box<dyn AdvisoryLock>>;

    /// Map a region of the file into memory.
    fn map(&self, offset: u64, len: u64) -> Result<MappedRegion>;

    /// Scatter a read across multiple buffers.
    fn read_vectored(&self, bufs: &mut [IoSliceMut<'_>]) -> Result<usize>;

    /// Gather a write from multiple buffers.
    fn write_vectored(&self, bufs: &[IoSlice<'_>]) -> Result<usize>;

    /// Copy `count` bytes starting at `offset` into `target`.
    fn transfer_to(&self, offset: u64, count: u64, target: &mut dyn Write) -> Result<u64>;

    /// Fill the file at `offset` with up to `count` bytes from `source`.
    fn transfer_from(&self, source: &mut dyn Read, offset: u64, count: u64) -> Result<u64>;
}

/// A held advisory lock on one file.
pub trait AdvisoryLock: Send {
    /// True until the lock has been released.
    fn is_valid(&self) -> bool;

    /// Give the lock back; a second call is a no-op.
    fn release(&mut self);
}

/// A materialized view of a mapped file region.
///
/// The in-memory store reports mapping as unsupported and never produces
/// one. Implementations without true mapping support may materialize the
/// region as an owned copy instead.
pub struct MappedRegion {
    bytes: Vec<u8>,
}

impl MappedRegion {
    /// Wrap an already-materialized region.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// View the mapped bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the mapped region in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the mapped region is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
