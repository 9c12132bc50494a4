//! The undo driver (§4.9): reverses a completed (or partially completed)
//! commit using the on-disk journal, then empties the journal and blob
//! store so undo is one-shot.

use crate::blob_store;
use crate::error::Result;
use crate::journal::BackupJournal;
use crate::paths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UndoStats {
    pub files_deleted: usize,
    pub moves_reversed: usize,
    pub files_restored: usize,
}

/// Undo the last commit. Returns `Ok(None)` if there was no journal to
/// undo (nothing to do).
pub fn undo() -> Result<Option<UndoStats>> {
    let journal_path = paths::journal_path();
    if !journal_path.is_file() {
        return Ok(None);
    }

    let journal = BackupJournal::take(&journal_path)?;
    if journal.is_empty() {
        blob_store::clear()?;
        return Ok(Some(UndoStats::default()));
    }

    let mut stats = UndoStats::default();

    // 1. Delete everything the run created.
    for path in &journal.files_created {
        match std::fs::remove_file(path) {
            Ok(()) => stats.files_deleted += 1,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "undo: failed to delete created file"),
        }
    }

    // 2. Reverse every rename, current -> original.
    for (original, current) in &journal.file_moves {
        match std::fs::rename(current, original) {
            Ok(()) => stats.moves_reversed += 1,
            Err(e) => tracing::warn!(
                original = %original.display(),
                current = %current.display(),
                error = %e,
                "undo: failed to reverse move"
            ),
        }
    }

    // 3. Restore every backed-up file from the blob store.
    for (&hash, path) in &journal.restored_files {
        match blob_store::restore(hash, path) {
            Ok(()) => stats.files_restored += 1,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "undo: failed to restore file"),
        }
    }

    blob_store::clear()?;

    Ok(Some(stats))
}
