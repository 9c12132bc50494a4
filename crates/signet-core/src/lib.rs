//! Data model and file-selection resolver for Signet, a batch audio-editing
//! engine for sample-library authors.
//!
//! This crate provides:
//!
//! - **The edit-tracked file model** ([`EditTrackedFile`], [`FileCollection`]):
//!   lazy-loaded audio with change tracking along three orthogonal axes
//!   (audio bytes, path, container format).
//! - **The neutral metadata record** ([`Metadata`]): loops, markers, regions,
//!   MIDI mapping and timing info, independent of WAV/FLAC container details.
//! - **The file-selection resolver** ([`path_resolver`]): expansion of
//!   include/exclude glob patterns into a canonical, de-duplicated path set.
//!
//! Audio decode/encode lives in `signet-codec`; DSP transformations that need
//! an external oracle live in `signet-dsp`; this crate only knows about the
//! neutral, in-memory representation of an edited file.

pub mod audio_samples;
pub mod edit_tracked_file;
pub mod error;
pub mod file_collection;
pub mod metadata;
pub mod path_resolver;

pub use audio_samples::{AudioSamples, ContainerFormat, RawChunk, RawContainerMetadata};
pub use edit_tracked_file::EditTrackedFile;
pub use error::{Error, Result};
pub use file_collection::FileCollection;
pub use metadata::{Loop, LoopType, MidiMapping, Marker, Metadata, Region, SamplerMapping, TimingInfo};
pub use path_resolver::{FilePathSet, ResolverOptions};
