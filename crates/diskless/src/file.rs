//! Ephemeral file handles
//!
//! `EphemeralFile` reproduces random-access file semantics over a growable
//! in-memory buffer: a logical size tracked independently of backing
//! capacity, zero-fill for reads past written data, cursor-relative and
//! position-explicit I/O, truncation, and single-holder advisory locking.

use std::io::{IoSlice, IoSliceMut, Read, Write};
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::buffer::DynamicBuffer;
use crate::error::{Error, Result};
use crate::traits::{AdvisoryLock, MappedRegion, RandomAccessFile};

/// State of one emulated file.
///
/// Invariant: every byte of `[0, size)` that lies inside the allocation is
/// either written data or an explicitly zeroed hole. Holes open up when a
/// write or truncate extends `size` past the cursor's previous high-water
/// mark; they are zeroed at extension time so pooled-buffer leftovers and
/// truncated-away bytes can never resurface.
struct FileInner {
    buffer: DynamicBuffer,
    /// Bytes the file logically contains. Gates read visibility and is
    /// independent of the buffer's capacity.
    size: usize,
    /// Advisory-lock hold count (0 or 1 in practice).
    locked: u32,
}

impl FileInner {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        let wanted = dst.len();
        let pos = self.buffer.position();
        let available = wanted
            .min(self.size.saturating_sub(pos))
            .min(self.buffer.remaining());
        self.buffer.get(&mut dst[..available]);
        dst[available..].fill(0);
        wanted
    }

    fn write(&mut self, src: &[u8]) -> usize {
        let start = self.buffer.position();
        if start > self.size {
            // Writing past the end opens a hole between the old size and
            // the write position; expose it as zeros, not stale bytes.
            self.buffer.zero_range(self.size, start);
        }
        self.buffer.put(src);
        self.size = self.size.max(self.buffer.position());
        src.len()
    }
}

/// Handle to one in-memory emulated file.
///
/// Cloning is cheap and shares the underlying state: the registry and
/// every caller that opened the same name observe one cursor, one size,
/// one set of contents.
///
/// Handles are not synchronized. Each call exclusively borrows the state
/// for its duration (an aliasing requirement, not a concurrency
/// guarantee), and nothing orders concurrent calls from multiple threads.
/// The emulation targets single-threaded or externally-synchronized test
/// usage.
#[derive(Clone)]
pub struct EphemeralFile {
    inner: Arc<RwLock<FileInner>>,
}

impl EphemeralFile {
    pub(crate) fn new(buffer: DynamicBuffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FileInner {
                buffer,
                size: 0,
                locked: 0,
            })),
        }
    }

    /// Rewind the cursor to 0; opening an existing name funnels through
    /// this.
    pub(crate) fn rewind(&self) {
        self.inner.write().unwrap().buffer.set_position(0);
    }

    /// Take the backing allocation for pool reuse.
    ///
    /// Any handle clone that survives the registry entry sees a detached,
    /// size-0 file afterwards; it never aliases the recycled memory.
    pub(crate) fn reclaim(&self) -> DynamicBuffer {
        let mut inner = self.inner.write().unwrap();
        inner.size = 0;
        std::mem::replace(&mut inner.buffer, DynamicBuffer::detached())
    }

    /// Read from the cursor into `dst`.
    ///
    /// Bytes between the cursor and the logical size come from the backing
    /// buffer; any shortfall is zero-filled rather than read from
    /// unwritten memory. The cursor advances only over the real bytes.
    /// Always reports the full `dst.len()` produced; callers distinguish
    /// real from synthetic content via [`size`](Self::size), not short
    /// reads.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize> {
        Ok(self.inner.write().unwrap().read(dst))
    }

    /// Write `src` at the cursor, growing the backing buffer as needed and
    /// extending the logical size when the cursor ends up past it.
    pub fn write(&self, src: &[u8]) -> Result<usize> {
        Ok(self.inner.write().unwrap().write(src))
    }

    /// Read at an explicit offset, leaving the cursor untouched.
    pub fn read_at(&self, dst: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        let saved = inner.buffer.position();
        inner.buffer.set_position(offset as usize);
        let produced = inner.read(dst);
        inner.buffer.set_position(saved);
        Ok(produced)
    }

    /// Write at an explicit offset, leaving the cursor untouched.
    pub fn write_at(&self, src: &[u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        let saved = inner.buffer.position();
        inner.buffer.set_position(offset as usize);
        let consumed = inner.write(src);
        inner.buffer.set_position(saved);
        Ok(consumed)
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.inner.read().unwrap().buffer.position() as u64
    }

    /// Move the cursor. No bounds check against the logical size: seeking
    /// past the end is legal, and a subsequent write there extends the
    /// file.
    pub fn seek(&self, pos: u64) {
        self.inner.write().unwrap().buffer.set_position(pos as usize);
    }

    /// Logical size in bytes.
    pub fn size(&self) -> u64 {
        self.inner.read().unwrap().size as u64
    }

    /// Bytes of backing memory currently allocated for this file.
    ///
    /// Diagnostic only; capacity grows independently of the logical size
    /// and never shrinks between pool cycles.
    pub fn capacity(&self) -> u64 {
        self.inner.read().unwrap().buffer.capacity() as u64
    }

    /// Set the logical size directly.
    ///
    /// The backing buffer is neither resized nor trimmed. Truncating up
    /// zeroes the newly exposed range, so offsets between the old and new
    /// size read as holes; truncating down makes the cut-off bytes
    /// unreadable, and a later re-extension exposes zeros over the gap,
    /// never the old contents.
    pub fn truncate(&self, new_size: u64) {
        let mut inner = self.inner.write().unwrap();
        let new_size = new_size as usize;
        let old_size = inner.size;
        if new_size > old_size {
            inner.buffer.zero_range(old_size, new_size);
        }
        inner.size = new_size;
    }

    /// Flush to durable storage: a no-op, there is nothing behind the
    /// buffer to sync.
    pub fn force(&self, _metadata: bool) -> Result<()> {
        Ok(())
    }

    /// Acquire the advisory lock, or `None` when it is already held.
    ///
    /// `None` means "try again", not failure; [`try_lock`](Self::try_lock)
    /// is the erroring variant and the two contracts are deliberately
    /// distinct. `shared` is accepted but not enforced: every granted
    /// lock is exclusive in effect.
    pub fn lock(&self, shared: bool) -> Result<Option<FileLock>> {
        let _ = shared;
        let mut inner = self.inner.write().unwrap();
        if inner.locked > 0 {
            return Ok(None);
        }
        inner.locked += 1;
        trace!("advisory lock acquired");
        Ok(Some(FileLock {
            file: Arc::clone(&self.inner),
            released: false,
        }))
    }

    /// Acquire the advisory lock, failing with [`Error::AlreadyLocked`]
    /// when it is already held.
    pub fn try_lock(&self, shared: bool) -> Result<FileLock> {
        self.lock(shared)?.ok_or(Error::AlreadyLocked)
    }

    /// Memory-mapped views are not supported by the in-memory emulation.
    pub fn map(&self, _offset: u64, _len: u64) -> Result<MappedRegion> {
        Err(Error::UnsupportedMapping)
    }

    /// Scatter reads are not supported by the in-memory emulation.
    pub fn read_vectored(&self, _bufs: &mut [IoSliceMut<'_>]) -> Result<usize> {
        Err(Error::Unsupported("vectored read"))
    }

    /// Gather writes are not supported by the in-memory emulation.
    pub fn write_vectored(&self, _bufs: &[IoSlice<'_>]) -> Result<usize> {
        Err(Error::Unsupported("vectored write"))
    }

    /// Channel-to-channel transfer is not supported by the in-memory
    /// emulation.
    pub fn transfer_to(
        &self,
        _offset: u64,
        _count: u64,
        _target: &mut dyn Write,
    ) -> Result<u64> {
        Err(Error::Unsupported("channel transfer"))
    }

    /// Channel-to-channel transfer is not supported by the in-memory
    /// emulation.
    pub fn transfer_from(
        &self,
        _source: &mut dyn Read,
        _offset: u64,
        _count: u64,
    ) -> Result<u64> {
        Err(Error::Unsupported("channel transfer"))
    }
}

impl RandomAccessFile for EphemeralFile {
    fn read(&self, dst: &mut [u8]) -> Result<usize> {
        EphemeralFile::read(self, dst)
    }

    fn write(&self, src: &[u8]) -> Result<usize> {
        EphemeralFile::write(self, src)
    }

    fn read_at(&self, dst: &mut [u8], offset: u64) -> Result<usize> {
        EphemeralFile::read_at(self, dst, offset)
    }

    fn write_at(&self, src: &[u8], offset: u64) -> Result<usize> {
        EphemeralFile::write_at(self, src, offset)
    }

    fn position(&self) -> u64 {
        EphemeralFile::position(self)
    }

    fn seek(&self, pos: u64) {
        EphemeralFile::seek(self, pos)
    }

    fn size(&self) -> u64 {
        EphemeralFile::size(self)
    }

    fn truncate(&self, new_size: u64) {
        EphemeralFile::truncate(self, new_size)
    }

    fn force(&self, metadata: bool) -> Result<()> {
        EphemeralFile::force(self, metadata)
    }

    fn lock(&self, shared: bool) -> Result<Option<Box<dyn AdvisoryLock>>> {
        let held = EphemeralFile::lock(self, shared)?;
        Ok(held.map(|lock| Box::new(lock) as Box<dyn AdvisoryLock>))
    }

    fn try_lock(&self, shared: bool) -> Result<Box<dyn AdvisoryLock>> {
        Ok(Box::new(EphemeralFile::try_lock(self, shared)?))
    }

    fn map(&self, offset: u64, len: u64) -> Result<MappedRegion> {
        EphemeralFile::map(self, offset, len)
    }

    fn read_vectored(&self, bufs: &mut [IoSliceMut<'_>]) -> Result<usize> {
        EphemeralFile::read_vectored(self, bufs)
    }

    fn write_vectored(&self, bufs: &[IoSlice<'_>]) -> Result<usize> {
        EphemeralFile::write_vectored(self, bufs)
    }

    fn transfer_to(&self, offset: u64, count: u64, target: &mut dyn Write) -> Result<u64> {
        EphemeralFile::transfer_to(self, offset, count, target)
    }

    fn transfer_from(&self, source: &mut dyn Read, offset: u64, count: u64) -> Result<u64> {
        EphemeralFile::transfer_from(self, source, offset, count)
    }
}

/// Advisory-lock token for one file.
///
/// Occupies the file's single hold slot until released. Release is
/// idempotent, and dropping an unreleased lock releases it, so a lock can
/// be scoped to a block without explicit cleanup.
pub struct FileLock {
    file: Arc<RwLock<FileInner>>,
    released: bool,
}

impl FileLock {
    /// True until the first release.
    pub fn is_valid(&self) -> bool {
        !self.released
    }

    /// Give the hold back. A second call is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        let mut inner = self.file.write().unwrap();
        inner.locked = inner.locked.saturating_sub(1);
        self.released = true;
        trace!("advisory lock released");
    }
}

impl AdvisoryLock for FileLock {
    fn is_valid(&self) -> bool {
        FileLock::is_valid(self)
    }

    fn release(&mut self) {
        FileLock::release(self)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        self.release();
    }
}
