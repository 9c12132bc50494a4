//! The backup journal (§3 `BackupJournal`, §4.8 step 4).
//!
//! Persisted as JSON, the same `serde` + on-disk-file shape
//! `sonido_config::Preset::load`/`save` use for TOML presets, but written
//! atomically: serialize to a sibling temp file, then rename onto the
//! journal path, so a crash mid-write never leaves a half-written journal
//! behind for `undo` to choke on.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths;

/// Stable 64-bit hash of an absolute path string. Only needs to be unique
/// within one journal, not stable across runs (§3).
pub fn hash_path(path: &Path) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    path.to_string_lossy().hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackupJournal {
    /// hash(original absolute path) → original absolute path, whose bytes
    /// are kept in the blob store.
    pub restored_files: HashMap<u64, PathBuf>,
    /// original absolute path → new absolute path.
    pub file_moves: HashMap<PathBuf, PathBuf>,
    /// Absolute paths of files created fresh during the run.
    pub files_created: Vec<PathBuf>,
}

impl BackupJournal {
    pub fn is_empty(&self) -> bool {
        self.restored_files.is_empty() && self.file_moves.is_empty() && self.files_created.is_empty()
    }

    /// Record that `path`'s pre-mutation bytes are about to be copied into
    /// the blob store under its path hash. Returns the hash so the caller
    /// can name the blob.
    pub fn record_restore(&mut self, path: &Path) -> u64 {
        let hash = hash_path(path);
        self.restored_files.insert(hash, path.to_path_buf());
        hash
    }

    pub fn record_move(&mut self, original: &Path, new: &Path) {
        self.file_moves.insert(original.to_path_buf(), new.to_path_buf());
    }

    pub fn record_created(&mut self, path: &Path) {
        self.files_created.push(path.to_path_buf());
    }

    /// Load the journal from `path`. An absent file is treated as an empty
    /// journal, not an error, since most runs never create one.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::read_journal(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the journal to `path` atomically: serialize to a randomly
    /// suffixed sibling temp file, then rename onto `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::create_dir(parent, e))?;
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let tmp_path = path.with_extension(format!("json.{suffix}.tmp"));

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp_path, content).map_err(|e| Error::write_journal(&tmp_path, e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| Error::rename(&tmp_path, path, e))?;
        Ok(())
    }

    /// Atomically consume the on-disk journal: rename it to a temp name
    /// (so a concurrent writer can't interleave), parse, then delete it
    /// (§4.9: "reads the journal atomically").
    pub fn take(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let tmp_path = path.with_extension(format!("json.{suffix}.consuming"));
        std::fs::rename(path, &tmp_path).map_err(|e| Error::rename(path, &tmp_path, e))?;
        let content = std::fs::read_to_string(&tmp_path).map_err(|e| Error::read_journal(&tmp_path, e))?;
        let journal = serde_json::from_str(&content)?;
        let _ = std::fs::remove_file(&tmp_path);
        Ok(journal)
    }
}

/// The journal at the well-known backup-store location (§5).
pub fn default_journal_path() -> PathBuf {
    paths::journal_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hash_path_is_stable_for_same_path() {
        let p = PathBuf::from("/a/b/c.wav");
        assert_eq!(hash_path(&p), hash_path(&p));
    }

    #[test]
    fn hash_path_differs_for_different_paths() {
        assert_ne!(
            hash_path(Path::new("/a/b/c.wav")),
            hash_path(Path::new("/a/b/d.wav"))
        );
    }

    #[test]
    fn empty_journal_is_empty() {
        assert!(BackupJournal::default().is_empty());
    }

    #[test]
    fn record_methods_populate_maps() {
        let mut j = BackupJournal::default();
        let hash = j.record_restore(Path::new("/a.wav"));
        j.record_move(Path::new("/a.wav"), Path::new("/b.wav"));
        j.record_created(Path::new("/c.wav"));
        assert_eq!(j.restored_files.get(&hash), Some(&PathBuf::from("/a.wav")));
        assert_eq!(j.file_moves.get(Path::new("/a.wav")), Some(&PathBuf::from("/b.wav")));
        assert_eq!(j.files_created, vec![PathBuf::from("/c.wav")]);
        assert!(!j.is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let journal_path = dir.path().join("backup.json");
        let mut j = BackupJournal::default();
        j.record_created(Path::new("/c.wav"));
        j.save(&journal_path).unwrap();
        let loaded = BackupJournal::load(&journal_path).unwrap();
        assert_eq!(loaded, j);
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let loaded = BackupJournal::load(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn take_removes_journal_and_returns_contents() {
        let dir = tempdir().unwrap();
        let journal_path = dir.path().join("backup.json");
        let mut j = BackupJournal::default();
        j.record_created(Path::new("/c.wav"));
        j.save(&journal_path).unwrap();

        let taken = BackupJournal::take(&journal_path).unwrap();
        assert_eq!(taken, j);
        assert!(!journal_path.exists());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let journal_path = dir.path().join("nested/deep/backup.json");
        let j = BackupJournal::default();
        j.save(&journal_path).unwrap();
        assert!(journal_path.is_file());
    }
}
