//! Growable byte buffer backing ephemeral files
//!
//! `DynamicBuffer` knows nothing about files. It is a single contiguous
//! byte region with a cursor, expanding on demand so files don't have to
//! be allocated at their eventual size up-front.

/// Capacity of a freshly allocated buffer.
pub(crate) const INITIAL_CAPACITY: usize = 64 * 1024;

/// Cap on the doubling growth strategy; past this, capacity grows in fixed
/// increments of this size.
pub(crate) const GROWTH_STEP: usize = 1024 * 1024;

/// Dynamically expanding byte region with a cursor.
///
/// Capacity only grows, never shrinks, for the lifetime of the buffer
/// between pool cycles. `clear` resets the cursor without touching
/// contents; the file layer gates visibility by logical size, so retained
/// bytes from a previous life are never observable.
#[derive(Debug)]
pub(crate) struct DynamicBuffer {
    /// Allocated region; `buf.len()` is the capacity.
    buf: Vec<u8>,
    /// Cursor into `buf`; may point past the allocation after a far seek.
    pos: usize,
}

impl DynamicBuffer {
    pub fn new() -> Self {
        Self {
            buf: vec![0; INITIAL_CAPACITY],
            pos: 0,
        }
    }

    /// A zero-capacity buffer, left behind in a handle whose real
    /// allocation was reclaimed by the pool.
    pub fn detached() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Bytes between the cursor and the end of the allocation.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Reset the cursor for reuse. Contents are retained.
    pub fn clear(&mut self) {
        self.pos = 0;
    }

    /// Copy bytes from the cursor into `dst`, advancing the cursor.
    ///
    /// Callers must stay within capacity; the file layer clamps reads to
    /// the logical size and to `remaining()` before calling.
    pub fn get(&mut self, dst: &mut [u8]) {
        let end = self.pos + dst.len();
        dst.copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end;
    }

    /// Copy `src` in at the cursor, growing if needed, advancing the
    /// cursor.
    pub fn put(&mut self, src: &[u8]) {
        self.ensure(src.len());
        let end = self.pos + src.len();
        self.buf[self.pos..end].copy_from_slice(src);
        self.pos = end;
    }

    /// Zero the bytes of `[from, to)` that fall inside the allocation.
    ///
    /// Newly grown capacity is already zeroed, so this is only needed when
    /// a previously written region is re-exposed as a hole.
    pub fn zero_range(&mut self, from: usize, to: usize) {
        let end = to.min(self.buf.len());
        if from < end {
            self.buf[from..end].fill(0);
        }
    }

    /// Grow so that `amount` bytes fit at the cursor.
    ///
    /// Capacity doubles while under [`GROWTH_STEP`], then grows by fixed
    /// [`GROWTH_STEP`] increments, or by the exact shortfall when a single
    /// request exceeds the doubling/increment step. Existing bytes and the
    /// cursor survive growth.
    fn ensure(&mut self, amount: usize) {
        let needed = self.pos + amount;
        if needed <= self.buf.len() {
            return;
        }
        let shortfall = needed - self.buf.len();
        let grow_by = self.buf.len().min(GROWTH_STEP).max(shortfall);
        self.buf.resize(self.buf.len() + grow_by, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_round_trip() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(b"hello world");
        buffer.set_position(0);

        let mut out = [0u8; 11];
        buffer.get(&mut out);
        assert_eq!(&out, b"hello world");
        assert_eq!(buffer.position(), 11);
    }

    #[test]
    fn test_growth_doubles_below_step() {
        let mut buffer = DynamicBuffer::new();
        assert_eq!(buffer.capacity(), INITIAL_CAPACITY);

        // One byte over capacity: doubles rather than growing by one.
        buffer.put(&vec![7u8; INITIAL_CAPACITY + 1]);
        assert_eq!(buffer.capacity(), INITIAL_CAPACITY * 2);
    }

    #[test]
    fn test_growth_fixed_step_above_cap() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(&vec![7u8; 3 * GROWTH_STEP]);
        let capacity = buffer.capacity();
        assert_eq!(capacity, 3 * GROWTH_STEP);

        // Past the doubling cap, growth proceeds in 1 MiB increments.
        buffer.put(&[1]);
        assert_eq!(buffer.capacity(), capacity + GROWTH_STEP);
    }

    #[test]
    fn test_growth_exact_for_oversized_request() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(b"ab");
        // A request bigger than the step grows by exactly the shortfall.
        buffer.put(&vec![7u8; 5 * GROWTH_STEP]);
        assert_eq!(buffer.capacity(), 5 * GROWTH_STEP + 2);
    }

    #[test]
    fn test_growth_preserves_contents_and_cursor() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(b"prefix");
        buffer.put(&vec![9u8; 2 * INITIAL_CAPACITY]);
        assert_eq!(buffer.position(), 6 + 2 * INITIAL_CAPACITY);

        buffer.set_position(0);
        let mut out = [0u8; 6];
        buffer.get(&mut out);
        assert_eq!(&out, b"prefix");
    }

    #[test]
    fn test_far_seek_write_grows_to_fit() {
        let mut buffer = DynamicBuffer::new();
        let offset = 10 * GROWTH_STEP;
        buffer.set_position(offset);
        buffer.put(b"x");
        assert!(buffer.capacity() >= offset + 1);

        buffer.set_position(offset);
        let mut out = [0u8; 1];
        buffer.get(&mut out);
        assert_eq!(&out, b"x");
    }

    #[test]
    fn test_clear_resets_cursor_keeps_capacity() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(&vec![7u8; 2 * INITIAL_CAPACITY]);
        let capacity = buffer.capacity();

        buffer.clear();
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_zero_range_clamps_to_allocation() {
        let mut buffer = DynamicBuffer::new();
        buffer.put(b"abcdef");
        buffer.zero_range(2, INITIAL_CAPACITY + 100);

        buffer.set_position(0);
        let mut out = [0u8; 6];
        buffer.get(&mut out);
        assert_eq!(&out, b"ab\0\0\0\0");
    }

    #[test]
    fn test_detached_buffer_grows_from_zero() {
        let mut buffer = DynamicBuffer::detached();
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.remaining(), 0);

        buffer.put(b"revived");
        assert_eq!(buffer.capacity(), 7);
    }
}
