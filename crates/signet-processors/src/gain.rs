//! Gain (§4.5 "Gain").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::{Error, Result};
use crate::processor::Processor;

#[derive(Debug, Clone, Copy)]
pub enum GainUnit {
    Db,
    Percent,
}

/// Flat linear-gain multiplier, specified either in dB or as a percentage
/// of full scale.
pub struct Gain {
    multiplier: f64,
}

impl Gain {
    pub fn new(value: f64, unit: GainUnit) -> Result<Self> {
        let multiplier = match unit {
            GainUnit::Db => 10f64.powf(value / 20.0),
            GainUnit::Percent => {
                if value < 0.0 {
                    return Err(Error::NegativeGainPercent(value));
                }
                value / 100.0
            }
        };
        Ok(Self { multiplier })
    }
}

impl Processor for Gain {
    fn name(&self) -> &'static str {
        "gain"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            file.audio_mut(loader).multiply_by_scalar(self.multiplier);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{AudioSamples, ContainerFormat, Metadata};
    use std::path::Path;

    struct FixedLoader;
    impl AudioLoader for FixedLoader {
        fn load(&self, _path: &Path) -> Option<AudioSamples> {
            Some(AudioSamples::new(vec![0.5, -0.5], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn rejects_negative_percent() {
        assert!(Gain::new(-10.0, GainUnit::Percent).is_err());
    }

    #[test]
    fn db_gain_doubles_at_positive_six_db() {
        let gain = Gain::new(6.0206, GainUnit::Db).unwrap();
        assert!((gain.multiplier - 2.0).abs() < 1e-3);
    }

    #[test]
    fn percent_gain_is_linear() {
        let gain = Gain::new(50.0, GainUnit::Percent).unwrap();
        assert!((gain.multiplier - 0.5).abs() < 1e-9);
    }

    #[test]
    fn process_files_applies_to_every_file() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut gain = Gain::new(50.0, GainUnit::Percent).unwrap();
        gain.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.25]);
    }
}
