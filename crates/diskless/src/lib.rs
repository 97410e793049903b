//! Diskless - in-memory random-access file store
//!
//! Part of the Everruns ecosystem.
//!
//! Emulates the operational surface of a disk-backed file layer (open,
//! create, delete, rename, size and existence queries, random-access
//! read/write, truncation, advisory locking) with every file backed by a
//! growable in-memory buffer. Storage-engine tests get file semantics
//! instantly, with no I/O cost, and stores are cheap to create and tear
//! down across many short-lived runs.
//!
//! Not provided, by design: durability, crash recovery, multi-process
//! semantics, memory-mapped views, and scatter/gather I/O. Handles are not
//! thread-safe; see [`EphemeralFile`].
//!
//! # Example
//!
//! ```rust
//! use diskless::EphemeralFileStore;
//!
//! fn main() -> diskless::Result<()> {
//!     let store = EphemeralFileStore::new();
//!
//!     let file = store.create("segment-000.log")?;
//!     file.write(b"hello")?;
//!
//!     file.seek(0);
//!     let mut buf = [0u8; 5];
//!     file.read(&mut buf)?;
//!     assert_eq!(&buf, b"hello");
//!
//!     store.rename("segment-000.log", "segment-001.log")?;
//!     assert_eq!(store.size("segment-001.log"), 5);
//!     Ok(())
//! }
//! ```

mod buffer;
mod error;
mod file;
mod pool;
mod store;
mod traits;

pub use error::{Error, Result};
pub use file::{EphemeralFile, FileLock};
pub use pool::BufferPool;
pub use store::EphemeralFileStore;
pub use traits::{AdvisoryLock, FileStore, MappedRegion, RandomAccessFile};
