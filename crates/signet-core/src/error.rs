//! Crate-wide error type.

use std::path::PathBuf;

/// Errors raised while resolving file selections or manipulating the
/// in-memory edit model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path-selection resolver produced no files.
    #[error("no files matched the given selection")]
    Empty,

    /// A non-glob include/exclude token was neither an existing file nor an
    /// existing directory.
    #[error("could not parse or find: {0}")]
    Unparseable(String),

    /// A metadata invariant (frame bounds) could not be satisfied.
    #[error("metadata invariant violated for {path}: {reason}")]
    InvariantViolation { path: PathBuf, reason: String },

    /// Standard I/O error encountered while walking directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type used throughout `signet-core`.
pub type Result<T> = std::result::Result<T, Error>;
