//! Platform temp-directory layout for the blob store and journal (§5).
//!
//! Mirrors the shape of `sonido_config::paths` (a fixed app subdirectory
//! under a platform base directory) but rooted at the temp directory rather
//! than the config directory, since the backup store is disposable scratch
//! state, not user configuration.

use std::path::PathBuf;

const APP_DIR: &str = "signet-backup";
const FILES_SUBDIR: &str = "files";
const JOURNAL_FILE: &str = "backup.json";

/// Root of the backup store: `$TEMP/signet-backup/`.
pub fn backup_root() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}

/// Directory holding byte-exact copies of overwritten/deleted files, keyed
/// by path hash.
pub fn blob_store_dir() -> PathBuf {
    backup_root().join(FILES_SUBDIR)
}

/// Path to a single blob, named after its 64-bit path hash.
pub fn blob_path(hash: u64) -> PathBuf {
    blob_store_dir().join(format!("{hash:016x}"))
}

/// Path to the journal file itself.
pub fn journal_path() -> PathBuf {
    backup_root().join(JOURNAL_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_root_is_under_temp_dir() {
        assert!(backup_root().starts_with(std::env::temp_dir()));
        assert!(backup_root().ends_with(APP_DIR));
    }

    #[test]
    fn blob_path_is_hex_named() {
        let p = blob_path(0xdead_beef);
        assert_eq!(p.file_name().unwrap().to_str().unwrap(), "00000000deadbeef");
    }
}
