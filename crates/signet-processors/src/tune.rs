//! Tune and Auto-tune (§4.5 "Tune", "Auto-tune").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;
use signet_dsp::{AutocorrelationDetector, CubicResampler, PitchDetectExt, PitchDetector, ResampleExt, Resampler};

use crate::error::Result;
use crate::processor::Processor;

/// Shifts every file's pitch by a fixed number of cents.
pub struct Tune {
    cents: f64,
    resampler: Box<dyn Resampler>,
}

impl Tune {
    pub fn new(cents: f64) -> Self {
        Self { cents, resampler: Box::new(CubicResampler) }
    }
}

impl Processor for Tune {
    fn name(&self) -> &'static str {
        "tune"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            file.audio_mut(loader).change_pitch(self.cents, self.resampler.as_ref());
        }
        Ok(())
    }
}

/// Detects each file's pitch and snaps it to the nearest semitone,
/// abstaining if it's already within 1 cent (§4.5).
pub struct AutoTune {
    detector: Box<dyn PitchDetector>,
    resampler: Box<dyn Resampler>,
}

impl Default for AutoTune {
    fn default() -> Self {
        Self {
            detector: Box::new(AutocorrelationDetector),
            resampler: Box::new(CubicResampler),
        }
    }
}

fn cents_to_nearest_semitone(detected: f64) -> f64 {
    let semitone = 69.0 + 12.0 * (detected / 440.0).log2();
    let nearest = semitone.round();
    (nearest - semitone) * 100.0
}

impl Processor for AutoTune {
    fn name(&self) -> &'static str {
        "auto-tune"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let Some(detected) = audio.detect_pitch(self.detector.as_ref()) else {
                continue;
            };
            let correction = cents_to_nearest_semitone(detected);
            if correction.abs() < 1.0 {
                continue;
            }
            audio.change_pitch(correction, self.resampler.as_ref());
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
            let samples: Vec<f64> = (0..4410)
                .map(|i| (i as f64 / 44100.0 * 440.0 * std::f64::consts::TAU).sin())
                .collect();
            Some(AudioSamples::new(samples, 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn cents_to_nearest_semitone_is_small_for_concert_a() {
        assert!(cents_to_nearest_semitone(440.0).abs() < 0.01);
    }

    #[test]
    fn tune_shifts_pitch_and_restores_rate() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut tune = Tune::new(1200.0);
        tune.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.sample_rate, 44100);
    }

    #[test]
    fn auto_tune_abstains_on_already_in_tune_note() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut auto_tune = AutoTune::default();
        auto_tune.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.frame_count(), 4410);
    }
}
