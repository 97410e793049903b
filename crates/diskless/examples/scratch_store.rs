//! Walk the full diskless surface the way a storage-engine harness would.
//!
//! Run with: cargo run --example scratch_store

use diskless::{BufferPool, EphemeralFileStore, Error};

fn main() -> anyhow::Result<()> {
    let pool = BufferPool::new();
    let store = EphemeralFileStore::with_pool(pool.clone());

    // Write a couple of fixed-size pages, then read one back at random.
    let segment = store.create("segment-000.db")?;
    for page in 0u8..8 {
        segment.write(&[page; 4096])?;
    }
    println!(
        "segment size {} bytes, backing capacity {} bytes",
        segment.size(),
        segment.capacity()
    );

    let mut page = [0u8; 4096];
    segment.read_at(&mut page, 5 * 4096)?;
    println!("page 5 starts with {:?}", &page[..4]);

    // Reads past the end are zero-filled, not errors.
    let mut past_end = [0xFFu8; 16];
    segment.read_at(&mut past_end, segment.size())?;
    println!("past end reads as {:?}", past_end);

    // Advisory locking: lock() misses return None, try_lock() errors.
    let held = segment.try_lock(false)?;
    match segment.try_lock(false) {
        Err(Error::AlreadyLocked) => println!("second locker told to back off"),
        Err(err) => println!("unexpected error: {err}"),
        Ok(_) => println!("unexpectedly acquired"),
    }
    drop(held);
    println!("lock released on drop: {}", segment.lock(false)?.is_some());

    // Rename keeps contents; delete recycles the buffer into the pool.
    store.rename("segment-000.db", "segment-001.db")?;
    println!(
        "renamed: exists(old)={} exists(new)={}",
        store.exists("segment-000.db"),
        store.exists("segment-001.db")
    );

    store.delete("segment-001.db");
    println!("pooled buffers after delete: {}", pool.pooled());

    // The next create skips allocation by reusing the pooled buffer.
    let reused = store.create("scratch.tmp")?;
    println!(
        "recreated with pooled capacity {} bytes, size {}",
        reused.capacity(),
        reused.size()
    );

    store.dispose();
    Ok(())
}
