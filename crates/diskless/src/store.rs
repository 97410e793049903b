//! File registry: the name-to-handle map
//!
//! `EphemeralFileStore` is the entry point callers use in place of a
//! disk-backed file layer. It owns every handle, serializes name-level
//! operations behind the map lock, and routes reclaimed buffers through
//! the pool when files are replaced, deleted, or the store is disposed.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Error, Result};
use crate::file::EphemeralFile;
use crate::pool::BufferPool;
use crate::traits::{FileStore, RandomAccessFile};

/// In-memory file registry.
///
/// Maps names to [`EphemeralFile`] handles, at most one live handle per
/// name. Name-level operations are linearizable behind the map lock;
/// handle-level I/O is not synchronized (see [`EphemeralFile`]).
///
/// Dropping the store disposes it, so buffers cannot strand in an
/// unreachable registry; call [`dispose`](Self::dispose) earlier to return
/// them at a point of your choosing.
pub struct EphemeralFileStore {
    files: RwLock<HashMap<String, EphemeralFile>>,
    pool: BufferPool,
}

impl Default for EphemeralFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemeralFileStore {
    /// Create a store with its own private buffer pool.
    pub fn new() -> Self {
        Self::with_pool(BufferPool::new())
    }

    /// Create a store that recycles buffers through a shared pool.
    ///
    /// Clone one [`BufferPool`] into several stores to share reclaimed
    /// memory across independent test registries.
    pub fn with_pool(pool: BufferPool) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            pool,
        }
    }

    /// Open the file at `name`, creating it if absent.
    ///
    /// An existing file keeps its contents and size; its cursor rewinds to
    /// 0. The returned handle shares state with every earlier handle for
    /// the same name.
    pub fn open(&self, name: &str) -> Result<EphemeralFile> {
        let mut files = self.files.write().unwrap();
        if let Some(file) = files.get(name) {
            file.rewind();
            return Ok(file.clone());
        }
        Ok(self.install(&mut files, name))
    }

    /// Create the file at `name`, recycling any file previously registered
    /// there.
    pub fn create(&self, name: &str) -> Result<EphemeralFile> {
        let mut files = self.files.write().unwrap();
        Ok(self.install(&mut files, name))
    }

    fn install(&self, files: &mut HashMap<String, EphemeralFile>, name: &str) -> EphemeralFile {
        let file = EphemeralFile::new(self.pool.acquire());
        if let Some(old) = files.insert(name.to_string(), file.clone()) {
            self.pool.release(old.reclaim());
        }
        debug!(name, "created ephemeral file");
        file
    }

    /// True iff a file is currently registered under `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.files.read().unwrap().contains_key(name)
    }

    /// Logical size of the file at `name`, or 0 when none exists.
    ///
    /// Deliberately lenient: a missing file is not an error here, unlike
    /// disk-file semantics.
    pub fn size(&self, name: &str) -> u64 {
        self.files
            .read()
            .unwrap()
            .get(name)
            .map_or(0, |file| file.size())
    }

    /// Remove and recycle the file at `name`. Always reports success, even
    /// when nothing was registered.
    pub fn delete(&self, name: &str) -> bool {
        let mut files = self.files.write().unwrap();
        if let Some(file) = files.remove(name) {
            self.pool.release(file.reclaim());
            debug!(name, "deleted ephemeral file");
        }
        true
    }

    /// Move the file registered at `from` to `to` without copying data.
    ///
    /// Fails with [`Error::NotFound`] when `from` has no file and
    /// [`Error::AlreadyExists`] when `to` already has one; either way the
    /// registry is left unchanged.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut files = self.files.write().unwrap();
        if files.contains_key(to) {
            return Err(Error::AlreadyExists(to.to_string()));
        }
        let file = files
            .remove(from)
            .ok_or_else(|| Error::NotFound(from.to_string()))?;
        files.insert(to.to_string(), file);
        debug!(from, to, "renamed ephemeral file");
        Ok(())
    }

    /// Recycle every registered file's buffer and clear the registry.
    ///
    /// Runs automatically on drop.
    pub fn dispose(&self) {
        let mut files = self.files.write().unwrap();
        let count = files.len();
        for (_, file) in files.drain() {
            self.pool.release(file.reclaim());
        }
        if count > 0 {
            debug!(count, "disposed ephemeral file store");
        }
    }
}

impl Drop for EphemeralFileStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl FileStore for EphemeralFileStore {
    fn open(&self, name: &str) -> Result<Box<dyn RandomAccessFile>> {
        Ok(Box::new(EphemeralFileStore::open(self, name)?))
    }

    fn create(&self, name: &str) -> Result<Box<dyn RandomAccessFile>> {
        Ok(Box::new(EphemeralFileStore::create(self, name)?))
    }

    fn exists(&self, name: &str) -> bool {
        EphemeralFileStore::exists(self, name)
    }

    fn size(&self, name: &str) -> u64 {
        EphemeralFileStore::size(self, name)
    }

    fn delete(&self, name: &str) -> bool {
        EphemeralFileStore::delete(self, name)
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        EphemeralFileStore::rename(self, from, to)
    }

    fn dispose(&self) {
        EphemeralFileStore::dispose(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_missing_file() {
        let store = EphemeralFileStore::new();
        assert!(!store.exists("a"));

        let file = store.open("a").unwrap();
        assert!(store.exists("a"));
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn test_open_rewinds_and_keeps_content() {
        let store = EphemeralFileStore::new();
        let file = store.create("a").unwrap();
        file.write(b"payload").unwrap();
        assert_eq!(file.position(), 7);

        let reopened = store.open("a").unwrap();
        assert_eq!(reopened.position(), 0);

        let mut out = [0u8; 7];
        reopened.read(&mut out).unwrap();
        assert_eq!(&out, b"payload");
    }

    #[test]
    fn test_create_replaces_content() {
        let store = EphemeralFileStore::new();
        let file = store.create("a").unwrap();
        file.write(b"old bytes").unwrap();

        let replaced = store.create("a").unwrap();
        assert_eq!(replaced.size(), 0);
        assert_eq!(store.size("a"), 0);

        let mut out = [0xAAu8; 9];
        replaced.read_at(&mut out, 0).unwrap();
        assert_eq!(&out, &[0u8; 9]);
    }

    #[test]
    fn test_size_is_lenient_for_missing_files() {
        let store = EphemeralFileStore::new();
        assert_eq!(store.size("nope"), 0);

        let file = store.create("a").unwrap();
        file.write(b"123").unwrap();
        assert_eq!(store.size("a"), 3);
    }

    #[test]
    fn test_delete_is_lenient() {
        let store = EphemeralFileStore::new();
        assert!(store.delete("never existed"));

        store.create("a").unwrap();
        assert!(store.delete("a"));
        assert!(!store.exists("a"));
    }

    #[test]
    fn test_rename_moves_handle_without_copy() {
        let store = EphemeralFileStore::new();
        let file = store.create("a").unwrap();
        file.write(b"data").unwrap();

        store.rename("a", "b").unwrap();
        assert!(!store.exists("a"));
        assert!(store.exists("b"));
        assert_eq!(store.size("b"), 4);

        // The earlier handle still points at the moved file.
        let mut out = [0u8; 4];
        file.read_at(&mut out, 0).unwrap();
        assert_eq!(&out, b"data");
    }

    #[test]
    fn test_rename_missing_source_fails() {
        let store = EphemeralFileStore::new();
        assert!(matches!(
            store.rename("x", "y"),
            Err(Error::NotFound(name)) if name == "x"
        ));
    }

    #[test]
    fn test_rename_onto_existing_target_fails() {
        let store = EphemeralFileStore::new();
        store.create("a").unwrap();
        store.create("b").unwrap();

        assert!(matches!(
            store.rename("a", "b"),
            Err(Error::AlreadyExists(name)) if name == "b"
        ));
        assert!(store.exists("a"));
        assert!(store.exists("b"));
    }

    #[test]
    fn test_delete_then_recreate_has_no_residue() {
        let store = EphemeralFileStore::new();
        let file = store.create("f").unwrap();
        file.write(b"residue").unwrap();

        store.delete("f");
        let recreated = store.create("f").unwrap();
        assert_eq!(recreated.size(), 0);

        let mut out = [0xAAu8; 7];
        recreated.read_at(&mut out, 0).unwrap();
        assert_eq!(&out, &[0u8; 7]);
    }

    #[test]
    fn test_recycling_feeds_the_pool() {
        let pool = BufferPool::new();
        let store = EphemeralFileStore::with_pool(pool.clone());

        store.create("a").unwrap();
        store.create("b").unwrap();
        assert_eq!(pool.pooled(), 0);

        store.delete("a");
        assert_eq!(pool.pooled(), 1);

        // Replacing b recycles its old buffer too.
        store.create("b").unwrap();
        assert_eq!(pool.pooled(), 2);
    }

    #[test]
    fn test_dispose_returns_all_buffers() {
        let pool = BufferPool::new();
        let store = EphemeralFileStore::with_pool(pool.clone());

        store.create("a").unwrap();
        store.create("b").unwrap();
        store.create("c").unwrap();

        store.dispose();
        assert_eq!(pool.pooled(), 3);
        assert!(!store.exists("a"));
    }

    #[test]
    fn test_drop_disposes() {
        let pool = BufferPool::new();
        {
            let store = EphemeralFileStore::with_pool(pool.clone());
            store.create("a").unwrap();
            store.create("b").unwrap();
        }
        assert_eq!(pool.pooled(), 2);
    }

    #[test]
    fn test_created_file_reuses_pooled_buffer() {
        let pool = BufferPool::new();
        let store = EphemeralFileStore::with_pool(pool.clone());

        // Grow a file well past the initial allocation, then recycle it.
        let file = store.create("big").unwrap();
        file.write(&vec![1u8; 512 * 1024]).unwrap();
        let grown = file.capacity();
        store.delete("big");

        let next = store.create("next").unwrap();
        assert_eq!(pool.pooled(), 0);
        assert_eq!(next.capacity(), grown);
        assert_eq!(next.size(), 0);
    }

    #[test]
    fn test_surviving_handle_after_delete_reads_empty() {
        let store = EphemeralFileStore::new();
        let file = store.create("a").unwrap();
        file.write(b"gone").unwrap();

        store.delete("a");
        assert_eq!(file.size(), 0);

        let mut out = [0xAAu8; 4];
        file.read_at(&mut out, 0).unwrap();
        assert_eq!(&out, &[0u8; 4]);
    }
}
