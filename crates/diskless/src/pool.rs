//! Reuse cache for reclaimed file buffers
//!
//! Deleting or replacing a file hands its allocation back to the pool, so
//! the next created file picks it up instead of paying for a fresh one.
//! Many short-lived test registries churn through files quickly; the pool
//! is what keeps that churn cheap.

use std::sync::{Arc, Mutex};

use crate::buffer::DynamicBuffer;

/// Unordered cache of reclaimed [`DynamicBuffer`]s.
///
/// Cloning shares the underlying pool, which is how several
/// [`EphemeralFileStore`](crate::EphemeralFileStore)s opt into shared
/// buffer reuse. The default is one private pool per store; there is no
/// hidden process-wide global.
///
/// No eviction policy and no size cap: buffers stay pooled until acquired
/// or until the last pool clone is dropped.
#[derive(Clone, Debug, Default)]
pub struct BufferPool {
    free: Arc<Mutex<Vec<DynamicBuffer>>>,
}

impl BufferPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop any pooled buffer, or allocate a fresh one when the pool is
    /// empty.
    ///
    /// A reused buffer keeps its grown capacity but has its cursor reset.
    /// Contents are not cleared; logical size tracking in the file layer
    /// gates reads, so a previous life's bytes are never visible.
    pub(crate) fn acquire(&self) -> DynamicBuffer {
        let mut free = self.free.lock().unwrap();
        match free.pop() {
            Some(mut buffer) => {
                buffer.clear();
                buffer
            }
            None => DynamicBuffer::new(),
        }
    }

    /// Return a buffer to the pool unconditionally.
    pub(crate) fn release(&self, buffer: DynamicBuffer) {
        self.free.lock().unwrap().push(buffer);
    }

    /// Number of buffers currently available for reuse.
    pub fn pooled(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}
