//! The journaled commit/backup engine and undo driver for Signet (§3, §4.8,
//! §4.9).
//!
//! `commit` walks a finished `FileCollection` and resolves each file's
//! three dirty bits into the §4.8 decision table, journaling every side
//! effect before performing it so an interrupted run can always be
//! reversed with `undo`.

pub mod blob_store;
pub mod commit;
pub mod error;
pub mod journal;
pub mod paths;
pub mod undo;

pub use commit::{commit, commit_with_journal, CommitStats};
pub use error::{Error, Result};
pub use journal::BackupJournal;
pub use undo::{undo, UndoStats};
