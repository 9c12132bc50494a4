//! Normalize (§4.5 "Normalize").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMeasure {
    Peak,
    Rms,
}

/// Scales every file so its peak or RMS level reaches `target` (linear,
/// `0..1`). By default the whole batch shares one gain (the loudest file
/// lands exactly on target, the rest follow proportionally); `independently`
/// normalizes each file on its own. `mix` (`0..=100`) interpolates between
/// no change (0) and the full computed gain (100).
pub struct Normalize {
    measure: NormalizeMeasure,
    target: f64,
    independently: bool,
    mix_percent: f64,
}

impl Normalize {
    pub fn new(measure: NormalizeMeasure, target: f64, independently: bool, mix_percent: f64) -> Self {
        Self { measure, target, independently, mix_percent: mix_percent.clamp(0.0, 100.0) }
    }

    fn measured(&self, audio: &signet_core::AudioSamples) -> f64 {
        match self.measure {
            NormalizeMeasure::Peak => audio.peak(),
            NormalizeMeasure::Rms => audio.rms(),
        }
    }
}

impl Processor for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        let measured: Vec<f64> = collection.iter_mut().map(|f| self.measured(f.audio_mut(loader))).collect();
        if measured.is_empty() {
            return Ok(());
        }

        let common_measured = measured.iter().cloned().fold(0.0_f64, f64::max);
        let mix = self.mix_percent / 100.0;

        for (file, &level) in collection.iter_mut().zip(measured.iter()) {
            let reference = if self.independently { level } else { common_measured };
            if reference <= 0.0 {
                continue;
            }
            let full_gain = self.target / reference;
            let gain = 1.0 + (full_gain - 1.0) * mix;
            file.audio_mut(loader).multiply_by_scalar(gain);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{AudioSamples, ContainerFormat, Metadata};
    use std::path::{Path, PathBuf};

    struct Loaders(Vec<f64>);
    impl AudioLoader for Loaders {
        fn load(&self, path: &Path) -> Option<AudioSamples> {
            let idx: usize = path.to_str().unwrap().parse().unwrap();
            Some(AudioSamples::new(vec![self.0[idx]], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn common_gain_brings_loudest_file_to_target() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("0"), PathBuf::from("1")]);
        let loader = Loaders(vec![0.5, 0.25]);
        let mut normalize = Normalize::new(NormalizeMeasure::Peak, 1.0, false, 100.0);
        normalize.process_files(&mut collection, &loader).unwrap();
        let loud = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert!((loud.samples[0] - 1.0).abs() < 1e-9);
        let quiet = collection.get_mut(1).unwrap().peek_audio().unwrap();
        assert!((quiet.samples[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn independent_normalization_brings_every_file_to_target() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("0"), PathBuf::from("1")]);
        let loader = Loaders(vec![0.5, 0.25]);
        let mut normalize = Normalize::new(NormalizeMeasure::Peak, 1.0, true, 100.0);
        normalize.process_files(&mut collection, &loader).unwrap();
        for i in 0..2 {
            let audio = collection.get_mut(i).unwrap().peek_audio().unwrap();
            assert!((audio.samples[0] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_mix_leaves_samples_unchanged() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("0")]);
        let loader = Loaders(vec![0.5]);
        let mut normalize = Normalize::new(NormalizeMeasure::Peak, 1.0, true, 0.0);
        normalize.process_files(&mut collection, &loader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert!((audio.samples[0] - 0.5).abs() < 1e-9);
    }
}
