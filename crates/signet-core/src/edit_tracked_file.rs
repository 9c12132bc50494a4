//! The edit-tracked file (§3 `EditTrackedFile`, §4.3).
//!
//! Decoding lives in `signet-codec`, a layer above this crate, so loading is
//! performed through the object-safe [`AudioLoader`] trait rather than a
//! direct dependency — the same seam `sonido-io`'s `AudioBackend` trait uses
//! to keep platform-specific code out of the core.

use std::path::{Path, PathBuf};

use crate::audio_samples::{AudioSamples, ContainerFormat};

/// Capability to decode a file on disk into an [`AudioSamples`] buffer.
///
/// Implemented by `signet-codec`'s dispatcher. Returning `None` signals a
/// non-fatal decode failure (§4.2.1); the caller is expected to have already
/// logged a warning tagged by path.
pub trait AudioLoader {
    fn load(&self, path: &Path) -> Option<AudioSamples>;
}

/// One file under edit: its original and current path, its lazily-loaded
/// audio, and the three independent dirty bits (§4.3).
#[derive(Debug, Clone)]
pub struct EditTrackedFile {
    original_path: PathBuf,
    current_path: PathBuf,
    audio: Option<AudioSamples>,
    original_container: Option<ContainerFormat>,
    audio_dirty: bool,
    path_dirty: bool,
    load_failed: bool,
}

impl EditTrackedFile {
    /// Create a new, unloaded tracked file for `path` (as emitted by the
    /// resolver).
    pub fn new(path: PathBuf) -> Self {
        Self {
            current_path: path.clone(),
            original_path: path,
            audio: None,
            original_container: None,
            audio_dirty: false,
            path_dirty: false,
            load_failed: false,
        }
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// `set_path` (§4.3): marks `path_dirty`, updates `current_path`.
    /// `original_path` never changes.
    pub fn set_path(&mut self, p: PathBuf) {
        self.path_dirty = true;
        self.current_path = p;
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn is_loaded(&self) -> bool {
        self.audio.is_some()
    }

    fn ensure_loaded(&mut self, loader: &dyn AudioLoader) {
        if self.audio.is_some() || self.load_failed {
            return;
        }
        match loader.load(&self.current_path) {
            Some(audio) => {
                self.original_container = Some(audio.container);
                self.audio = Some(audio);
            }
            None => {
                self.load_failed = true;
                tracing::warn!(path = %self.current_path.display(), "failed to decode file");
            }
        }
    }

    /// Read access (§4.3): loads on first call, returns a zero-sample
    /// placeholder if decoding previously failed.
    pub fn audio(&mut self, loader: &dyn AudioLoader) -> &AudioSamples {
        self.ensure_loaded(loader);
        self.audio.get_or_insert_with(|| {
            AudioSamples::new(
                Vec::new(),
                1,
                44100,
                16,
                ContainerFormat::Wav,
                crate::metadata::Metadata::default(),
            )
        })
    }

    /// Write access (§4.3): as `audio`, plus sets `audio_dirty`.
    pub fn audio_mut(&mut self, loader: &dyn AudioLoader) -> &mut AudioSamples {
        self.ensure_loaded(loader);
        self.audio_dirty = true;
        self.audio.get_or_insert_with(|| {
            AudioSamples::new(
                Vec::new(),
                1,
                44100,
                16,
                ContainerFormat::Wav,
                crate::metadata::Metadata::default(),
            )
        })
    }

    /// Peek at the audio without triggering a load or setting dirty bits.
    /// Returns `None` if not yet loaded.
    pub fn peek_audio(&self) -> Option<&AudioSamples> {
        self.audio.as_ref()
    }

    pub fn audio_changed(&self) -> bool {
        self.audio_dirty && !self.load_failed
    }

    pub fn path_changed(&self) -> bool {
        self.path_dirty
    }

    /// `format_changed` (§4.3): only meaningful once loaded.
    pub fn format_changed(&self) -> bool {
        match (&self.audio, self.original_container) {
            (Some(audio), Some(original)) => audio.container != original,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;

    struct FixedLoader(Option<AudioSamples>);
    impl AudioLoader for FixedLoader {
        fn load(&self, _path: &Path) -> Option<AudioSamples> {
            self.0.clone()
        }
    }

    fn audio() -> AudioSamples {
        AudioSamples::new(vec![0.0, 0.0], 1, 44100, 16, ContainerFormat::Wav, Metadata::default())
    }

    #[test]
    fn fresh_file_is_unloaded_and_clean() {
        let f = EditTrackedFile::new(PathBuf::from("x.wav"));
        assert!(!f.is_loaded());
        assert!(!f.audio_changed());
        assert!(!f.path_changed());
        assert!(!f.format_changed());
    }

    #[test]
    fn audio_mut_sets_audio_dirty() {
        let loader = FixedLoader(Some(audio()));
        let mut f = EditTrackedFile::new(PathBuf::from("x.wav"));
        let _ = f.audio_mut(&loader);
        assert!(f.is_loaded());
        assert!(f.audio_changed());
    }

    #[test]
    fn audio_read_only_does_not_dirty() {
        let loader = FixedLoader(Some(audio()));
        let mut f = EditTrackedFile::new(PathBuf::from("x.wav"));
        let _ = f.audio(&loader);
        assert!(f.is_loaded());
        assert!(!f.audio_changed());
    }

    #[test]
    fn failed_load_yields_placeholder_and_marks_failed() {
        let loader = FixedLoader(None);
        let mut f = EditTrackedFile::new(PathBuf::from("x.wav"));
        let placeholder = f.audio(&loader);
        assert_eq!(placeholder.frame_count(), 0);
        assert!(f.load_failed());
        assert!(!f.audio_changed()); // load_failed suppresses audio_changed
    }

    #[test]
    fn set_path_marks_path_dirty_but_not_original() {
        let mut f = EditTrackedFile::new(PathBuf::from("x.wav"));
        f.set_path(PathBuf::from("y.wav"));
        assert!(f.path_changed());
        assert_eq!(f.original_path(), Path::new("x.wav"));
        assert_eq!(f.current_path(), Path::new("y.wav"));
    }

    #[test]
    fn format_changed_detects_container_mismatch() {
        let mut flac = audio();
        flac.container = ContainerFormat::Flac;
        let loader = FixedLoader(Some(flac));
        let mut f = EditTrackedFile::new(PathBuf::from("x.wav"));
        let _ = f.audio(&loader);
        assert!(f.format_changed());
    }
}
