//! Sample-blend (§4.5 "Sample-blend").
//!
//! Between each pair of neighbouring root-noted samples in a folder,
//! synthesizes new samples at every semitone in between: a crossfade of
//! both neighbours, each pitch-shifted to the target note, weighted by
//! proximity to whichever neighbour is closer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use signet_backup::BackupJournal;
use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;
use signet_core::AudioSamples;
use signet_dsp::{AutocorrelationDetector, CubicResampler, PitchDetectExt, PitchDetector, ResampleExt, Resampler};

use crate::error::Result;
use crate::processor::Processor;

fn midi_note_from_freq(freq: f64) -> i32 {
    (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32
}

fn cents_between_notes(from_midi: i32, to_midi: i32) -> f64 {
    (to_midi - from_midi) as f64 * 100.0
}

pub struct SampleBlend {
    detector: Box<dyn PitchDetector>,
    resampler: Box<dyn Resampler>,
}

impl Default for SampleBlend {
    fn default() -> Self {
        Self {
            detector: Box::new(AutocorrelationDetector),
            resampler: Box::new(CubicResampler),
        }
    }
}

impl SampleBlend {
    fn blend_pair(&self, low: &AudioSamples, low_note: i32, high: &AudioSamples, high_note: i32, target_note: i32) -> AudioSamples {
        let mut low_shifted = low.clone();
        low_shifted.change_pitch(cents_between_notes(low_note, target_note), self.resampler.as_ref());
        let mut high_shifted = high.clone();
        high_shifted.change_pitch(cents_between_notes(high_note, target_note), self.resampler.as_ref());

        let t = (target_note - low_note) as f64 / (high_note - low_note) as f64;
        low_shifted.multiply_by_scalar(1.0 - t);
        high_shifted.multiply_by_scalar(t);
        low_shifted.add(&high_shifted);
        low_shifted
    }
}

impl Processor for SampleBlend {
    fn name(&self) -> &'static str {
        "sample-blend"
    }

    fn generate_files(&mut self, collection: &mut FileCollection, journal: &mut BackupJournal, loader: &dyn AudioLoader) -> Result<()> {
        let mut by_folder: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for i in 0..collection.len() {
            let parent = collection.get(i).unwrap().current_path().parent().map(Path::to_path_buf).unwrap_or_default();
            by_folder.entry(parent).or_default().push(i);
        }

        for (folder, indices) in by_folder {
            let mut notes: Vec<(i32, usize)> = Vec::new();
            for &i in &indices {
                let file = collection.get_mut(i).unwrap();
                let Some(freq) = file.audio_mut(loader).detect_pitch(self.detector.as_ref()) else {
                    continue;
                };
                notes.push((midi_note_from_freq(freq), i));
            }
            notes.sort_by_key(|&(note, _)| note);

            for pair in notes.windows(2) {
                let (low_note, low_idx) = pair[0];
                let (high_note, high_idx) = pair[1];
                if high_note - low_note <= 1 {
                    continue;
                }
                let low_audio = collection.get_mut(low_idx).unwrap().audio_mut(loader).clone();
                let high_audio = collection.get_mut(high_idx).unwrap().audio_mut(loader).clone();

                for target_note in (low_note + 1)..high_note {
                    let blended = self.blend_pair(&low_audio, low_note, &high_audio, high_note, target_note);
                    let path = folder.join(format!("blend-midi{target_note}.{}", blended.container.extension()));
                    journal.record_created(&path);
                    signet_codec::write(&path, &blended, None)?;
                }
            }
        }
        Ok(())
    }
}
