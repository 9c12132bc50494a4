//! Crate-wide error type.

/// Errors raised by resampling, pitch detection, or the drift corrector.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("identical-processing group {group}: frame counts differ ({expected} vs {found})")]
    GroupFrameCountMismatch {
        group: String,
        expected: usize,
        found: usize,
    },

    #[error("identical-processing regex must have exactly one capture group")]
    BadGroupingPattern,

    #[error(transparent)]
    Core(#[from] signet_core::Error),
}

/// Convenience result type used throughout `signet-dsp`.
pub type Result<T> = std::result::Result<T, Error>;
