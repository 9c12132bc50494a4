//! Resampling, pitch detection, and the pitch-drift corrector (§4.2.3, §4.6)
//! for the Signet batch audio editor.
//!
//! The resampling kernel and the pitch-detection primitive are both
//! specified as external oracles; [`resample::Resampler`] and
//! [`pitch::PitchDetector`] name those seams, with a concrete (if modest)
//! default implementation of each so the rest of the crate has something
//! real to run against.

pub mod drift_corrector;
pub mod error;
pub mod identical_processing_set;
pub mod pitch;
pub mod resample;

pub use drift_corrector::{apply_schedule, build_schedule, correct_pitch_drift, DriftCorrectorConfig, DriftResult};
pub use error::{Error, Result};
pub use pitch::{AutocorrelationDetector, PitchDetectExt, PitchDetector};
pub use resample::{CubicResampler, ResampleExt, Resampler};
