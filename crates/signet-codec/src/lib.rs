//! WAV and FLAC decode/encode for the Signet batch audio editor (§4.2).
//!
//! This crate implements `signet_core::edit_tracked_file::AudioLoader` so
//! the core edit model can stay decode-agnostic, and exposes a free
//! [`write`] function the commit engine calls when flushing an edited file
//! back to disk.

pub mod error;
pub mod flac;
pub mod quantize;
pub mod wav;

pub use error::{Error, Result};

use std::path::Path;

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::{AudioSamples, ContainerFormat};

fn container_for(path: &Path) -> Result<ContainerFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => Ok(ContainerFormat::Wav),
        Some(ext) if ext.eq_ignore_ascii_case("flac") => Ok(ContainerFormat::Flac),
        other => Err(Error::UnknownContainer(format!("{other:?}"))),
    }
}

/// Decode `path`, dispatching on its extension.
pub fn read<P: AsRef<Path>>(path: P) -> Result<AudioSamples> {
    let path = path.as_ref();
    match container_for(path)? {
        ContainerFormat::Wav => wav::read(path),
        ContainerFormat::Flac => flac::read(path),
    }
}

/// Encode and write `audio` to `path`, dispatching on `audio.container`
/// (not the path's extension — a reformat operation changes the former and
/// the rename processor the latter, independently, per §4.3).
pub fn write<P: AsRef<Path>>(path: P, audio: &AudioSamples, bits_override: Option<u16>) -> Result<()> {
    match audio.container {
        ContainerFormat::Wav => wav::write(path, audio, bits_override),
        ContainerFormat::Flac => flac::write(path, audio, bits_override),
    }
}

/// The `AudioLoader` implementation handed to `signet-core`'s edit-tracked
/// files. Decode failures are logged here and surfaced as `None`, never a
/// panic, matching §4.2.1's "skip and warn" contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct Codec;

impl AudioLoader for Codec {
    fn load(&self, path: &Path) -> Option<AudioSamples> {
        match read(path) {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "decode failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::Metadata;
    use tempfile::tempdir;

    #[test]
    fn dispatches_by_extension_on_read() {
        let dir = tempdir().unwrap();
        let wav_path = dir.path().join("a.wav");
        let audio = AudioSamples::new(vec![0.0; 100], 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        write(&wav_path, &audio, None).unwrap();
        let decoded = read(&wav_path).unwrap();
        assert_eq!(decoded.container, ContainerFormat::Wav);
    }

    #[test]
    fn unknown_extension_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ogg");
        std::fs::write(&path, b"nope").unwrap();
        assert!(read(&path).is_err());
    }

    #[test]
    fn codec_loader_returns_none_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not a wav").unwrap();
        let codec = Codec;
        assert!(codec.load(&path).is_none());
    }
}
