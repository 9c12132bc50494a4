//! The blob store: byte-exact copies of files the commit engine is about
//! to overwrite or delete, keyed by path hash (§3, §4.8 step 4).

use std::path::Path;

use crate::error::{Error, Result};
use crate::paths;

/// Copy `path`'s current bytes into the blob store under `hash`, creating
/// the store directory if needed. Call this *before* the mutating write or
/// delete it protects against.
pub fn store(hash: u64, path: &Path) -> Result<()> {
    let dir = paths::blob_store_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| Error::create_dir(&dir, e))?;
    }
    let blob_path = paths::blob_path(hash);
    std::fs::copy(path, &blob_path).map_err(|e| Error::copy(path, &blob_path, e))?;
    Ok(())
}

/// Restore the blob for `hash` onto `path`, overwriting whatever is there.
pub fn restore(hash: u64, path: &Path) -> Result<()> {
    let blob_path = paths::blob_path(hash);
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::create_dir(parent, e))?;
    }
    std::fs::copy(&blob_path, path).map_err(|e| Error::copy(&blob_path, path, e))?;
    Ok(())
}

/// Empty the blob store entirely (§4.8 step 2, §4.9 "one-shot").
pub fn clear() -> Result<()> {
    let dir = paths::blob_store_dir();
    if dir.exists() {
        std::fs::remove_dir_all(&dir).map_err(|e| Error::create_dir(&dir, e))?;
    }
    Ok(())
}
