//! Errors for the commit/backup engine and undo driver (§4.8, §4.9).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("two or more files would be written to the same path; aborting before touching disk")]
    WritingConflict,

    #[error("failed to read journal '{path}': {source}")]
    ReadJournal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write journal '{path}': {source}")]
    WriteJournal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse journal: {0}")]
    ParseJournal(#[from] serde_json::Error),

    #[error("failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] signet_codec::Error),
}

impl Error {
    pub fn read_journal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ReadJournal { path: path.into(), source }
    }

    pub fn write_journal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::WriteJournal { path: path.into(), source }
    }

    pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Rename { from: from.into(), to: to.into(), source }
    }

    pub fn copy(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Copy { from: from.into(), to: to.into(), source }
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::CreateDir { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
