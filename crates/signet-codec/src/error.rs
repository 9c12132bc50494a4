//! Crate-wide error type.

/// Errors raised while decoding or encoding WAV/FLAC audio.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid WAV file: {0}")]
    InvalidWav(String),

    #[error("invalid FLAC file: {0}")]
    InvalidFlac(String),

    #[error("{container} does not support {bits}-bit samples")]
    UnsupportedBitDepth { container: &'static str, bits: u16 },

    #[error("unrecognized container for {0}")]
    UnknownContainer(String),

    #[error(transparent)]
    Core(#[from] signet_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type used throughout `signet-codec`.
pub type Result<T> = std::result::Result<T, Error>;
