//! Errors raised by individual processors (§4.5).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("gain percentage must be non-negative, got {0}")]
    NegativeGainPercent(f64),

    #[error("unknown rename token <{0}>")]
    UnknownRenameToken(String),

    #[error("invalid rename pattern: {0}")]
    BadRenamePattern(String),

    #[error("invalid folderise pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("convert target {container:?}/{bits}-bit is not a valid combination")]
    InvalidConvertTarget { container: signet_core::ContainerFormat, bits: u16 },

    #[error(transparent)]
    Dsp(#[from] signet_dsp::Error),

    #[error(transparent)]
    Codec(#[from] signet_codec::Error),

    #[error(transparent)]
    Core(#[from] signet_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
