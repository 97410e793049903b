//! Error types for diskless
//!
//! Registry operations favor permissive behavior for test ergonomics:
//! missing files yield benign defaults (size 0, exists false, delete
//! succeeds trivially) rather than errors. The variants below cover the few
//! operations that do fail, plus the explicitly unsupported surfaces.

use thiserror::Error;

/// Result type alias using diskless's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Diskless error types.
///
/// Every failure is reported synchronously and leaves prior state
/// unchanged; there is no retry policy and no partial-failure state.
#[derive(Error, Debug)]
pub enum Error {
    /// Rename source has no registered file.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Rename target already has a registered file.
    #[error("file already exists: {0}")]
    AlreadyExists(String),

    /// An exclusive lock is already held on the file.
    #[error("file is already locked")]
    AlreadyLocked,

    /// Operation is not provided by the in-memory emulation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Memory-mapped views are not provided by the in-memory emulation.
    ///
    /// Reported distinctly from [`Error::Unsupported`] so callers probing
    /// for mapping support can tell a missing capability apart from the
    /// generic refusals on the vectored and transfer paths.
    #[error("memory mapping is not supported")]
    UnsupportedMapping,

    /// I/O error from a disk-backed [`FileStore`](crate::FileStore)
    /// implementation. The in-memory store never produces one.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
