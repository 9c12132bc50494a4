//! The commit/backup engine (§4.8): turns a finished `FileCollection` into
//! on-disk side effects, journaling each one before it happens so `undo`
//! can always reverse exactly what completed.

use std::path::{Path, PathBuf};

use signet_core::file_collection::FileCollection;

use crate::blob_store;
use crate::error::Result;
use crate::journal::BackupJournal;
use crate::paths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub no_op: usize,
    pub renamed: usize,
    pub written: usize,
    pub deleted_originals: usize,
}

/// What a single file's three dirty bits resolve to (§4.8 step 3).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    NoOp,
    /// Path changed but neither the samples nor the container did: a plain
    /// filesystem rename, no re-encode.
    Rename { from: PathBuf, to: PathBuf },
    /// Samples and/or the path/container changed: encode to `target`,
    /// and if `target != original`, the original is abandoned and must be
    /// removed after being backed up.
    Write { target: PathBuf, original: PathBuf },
}

fn decide(original: &Path, current: &Path, audio_dirty: bool, path_dirty: bool, format_dirty: bool, new_extension: &str) -> Decision {
    if !audio_dirty && !path_dirty && !format_dirty {
        return Decision::NoOp;
    }
    if !audio_dirty && path_dirty && !format_dirty {
        return Decision::Rename { from: original.to_path_buf(), to: current.to_path_buf() };
    }
    let target = if format_dirty {
        current.with_extension(new_extension)
    } else {
        current.to_path_buf()
    };
    Decision::Write { target, original: original.to_path_buf() }
}

/// Run the commit engine over every file in `collection`, starting from a
/// fresh journal and an empty blob store.
///
/// Returns `Ok` with per-outcome counts on success. On the first I/O
/// failure, further files are not processed; the journal persisted so far
/// reflects every side effect that completed, and the caller should surface
/// a "run `signet undo`" message (§4.8 step 5).
pub fn commit(collection: &FileCollection) -> Result<CommitStats> {
    commit_with_journal(collection, None)
}

/// As [`commit`], but continues an already-started journal instead of
/// resetting it. Used when a generator processor (e.g. sample-blend) has
/// already written files and recorded `files_created` entries earlier in
/// the same run, so undo can still reverse everything from one journal.
pub fn commit_with_journal(collection: &FileCollection, started: Option<BackupJournal>) -> Result<CommitStats> {
    if collection.would_writing_conflict() {
        return Err(crate::error::Error::WritingConflict);
    }

    let decisions: Vec<Decision> = collection
        .iter()
        .map(|f| {
            decide(
                f.original_path(),
                f.current_path(),
                f.audio_changed(),
                f.path_changed(),
                f.format_changed(),
                f.peek_audio().map(|a| a.container.extension()).unwrap_or("wav"),
            )
        })
        .collect();

    if decisions.iter().all(|d| *d == Decision::NoOp) {
        return Ok(CommitStats::default());
    }

    let journal_path = paths::journal_path();
    let mut journal = match started {
        Some(journal) => journal,
        None => {
            blob_store::clear()?;
            BackupJournal::default()
        }
    };
    journal.save(&journal_path)?;

    let mut stats = CommitStats::default();

    for (decision, file) in decisions.into_iter().zip(collection.iter()) {
        match decision {
            Decision::NoOp => stats.no_op += 1,
            Decision::Rename { from, to } => {
                journal.record_move(&from, &to);
                journal.save(&journal_path)?;
                if let Some(parent) = to.parent()
                    && !parent.exists()
                {
                    std::fs::create_dir_all(parent).map_err(|e| crate::error::Error::create_dir(parent, e))?;
                }
                if let Err(e) = std::fs::rename(&from, &to) {
                    let _ = std::fs::rename(&to, &from);
                    return Err(crate::error::Error::rename(from, to, e));
                }
                stats.renamed += 1;
            }
            Decision::Write { target, original } => {
                let audio = file
                    .peek_audio()
                    .expect("a file with audio_dirty or format_dirty must already be loaded");

                if target == original {
                    // Overwrite-in-place: back up the pre-mutation bytes
                    // before writing over them.
                    if original.is_file() {
                        let hash = journal.record_restore(&original);
                        journal.save(&journal_path)?;
                        blob_store::store(hash, &original)?;
                    }
                    signet_codec::write(&target, audio, None)?;
                } else {
                    // A brand-new path takes over for the original, which
                    // is abandoned (and backed up) below.
                    journal.record_created(&target);
                    journal.save(&journal_path)?;
                    if let Some(parent) = target.parent()
                        && !parent.exists()
                    {
                        std::fs::create_dir_all(parent).map_err(|e| crate::error::Error::create_dir(parent, e))?;
                    }
                    signet_codec::write(&target, audio, None)?;

                    if original.is_file() {
                        let hash = journal.record_restore(&original);
                        journal.save(&journal_path)?;
                        blob_store::store(hash, &original)?;
                        std::fs::remove_file(&original).map_err(|e| crate::error::Error::copy(&original, &target, e))?;
                        stats.deleted_originals += 1;
                    }
                }
                stats.written += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{AudioSamples, ContainerFormat, Metadata};
    use std::sync::Mutex;
    use tempfile::tempdir;

    static LOCK: Mutex<()> = Mutex::new(());

    fn audio() -> AudioSamples {
        AudioSamples::new(vec![0.1, -0.1, 0.2, -0.2], 1, 44100, 16, ContainerFormat::Wav, Metadata::default())
    }

    #[test]
    fn decide_no_dirty_bits_is_noop() {
        let d = decide(Path::new("a.wav"), Path::new("a.wav"), false, false, false, "wav");
        assert_eq!(d, Decision::NoOp);
    }

    #[test]
    fn decide_path_only_is_rename() {
        let d = decide(Path::new("a.wav"), Path::new("b.wav"), false, true, false, "wav");
        assert_eq!(d, Decision::Rename { from: PathBuf::from("a.wav"), to: PathBuf::from("b.wav") });
    }

    #[test]
    fn decide_audio_only_is_overwrite_in_place() {
        let d = decide(Path::new("a.wav"), Path::new("a.wav"), true, false, false, "wav");
        assert_eq!(d, Decision::Write { target: PathBuf::from("a.wav"), original: PathBuf::from("a.wav") });
    }

    #[test]
    fn decide_format_only_swaps_extension_and_abandons_original() {
        let d = decide(Path::new("a.wav"), Path::new("a.wav"), false, false, true, "flac");
        assert_eq!(d, Decision::Write { target: PathBuf::from("a.flac"), original: PathBuf::from("a.wav") });
    }

    #[test]
    fn decide_path_and_format_writes_current_path_new_extension() {
        let d = decide(Path::new("a.wav"), Path::new("b.wav"), false, true, true, "flac");
        assert_eq!(d, Decision::Write { target: PathBuf::from("b.flac"), original: PathBuf::from("a.wav") });
    }

    #[test]
    fn commit_overwrite_in_place_writes_and_backs_up() {
        let _guard = LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.wav");
        signet_codec::write(&path, &audio(), None).unwrap();

        let mut collection = FileCollection::from_paths(vec![path.clone()]);
        let codec = signet_codec::Codec;
        {
            let f = collection.get_mut(0).unwrap();
            let a = f.audio_mut(&codec);
            a.multiply_by_scalar(0.5);
        }

        let stats = commit(&collection).unwrap();
        assert_eq!(stats.written, 1);
        let hash = crate::journal::hash_path(&path);
        assert!(paths::blob_path(hash).is_file());
        blob_store::clear().unwrap();
        let _ = std::fs::remove_file(paths::journal_path());
    }

    #[test]
    fn commit_rename_only_moves_file() {
        let _guard = LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.wav");
        let to = dir.path().join("renamed.wav");
        signet_codec::write(&from, &audio(), None).unwrap();

        let mut collection = FileCollection::from_paths(vec![from.clone()]);
        collection.get_mut(0).unwrap().set_path(to.clone());
        collection.rebuild_index();

        let stats = commit(&collection).unwrap();
        assert_eq!(stats.renamed, 1);
        assert!(!from.exists());
        assert!(to.exists());
        blob_store::clear().unwrap();
        let _ = std::fs::remove_file(paths::journal_path());
    }

    #[test]
    fn commit_conflicting_paths_aborts() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        signet_codec::write(&a, &audio(), None).unwrap();
        signet_codec::write(&b, &audio(), None).unwrap();

        let mut collection = FileCollection::from_paths(vec![a.clone(), b.clone()]);
        collection.get_mut(1).unwrap().set_path(a.clone());
        collection.rebuild_index();

        assert!(commit(&collection).is_err());
    }

    #[test]
    fn commit_with_journal_preserves_pre_seeded_entries() {
        let _guard = LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let generated = dir.path().join("generated.wav");
        signet_codec::write(&generated, &audio(), None).unwrap();
        let mut journal = BackupJournal::default();
        journal.record_created(&generated);

        let path = dir.path().join("a.wav");
        signet_codec::write(&path, &audio(), None).unwrap();
        let mut collection = FileCollection::from_paths(vec![path.clone()]);
        let codec = signet_codec::Codec;
        collection.get_mut(0).unwrap().audio_mut(&codec).multiply_by_scalar(0.5);

        commit_with_journal(&collection, Some(journal)).unwrap();
        let saved = BackupJournal::load(&paths::journal_path()).unwrap();
        assert!(saved.files_created.contains(&generated));
        blob_store::clear().unwrap();
        let _ = std::fs::remove_file(paths::journal_path());
    }

    #[test]
    fn commit_all_clean_skips_journal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.wav");
        signet_codec::write(&path, &audio(), None).unwrap();
        let collection = FileCollection::from_paths(vec![path]);
        let stats = commit(&collection).unwrap();
        assert_eq!(stats, CommitStats::default());
    }
}
