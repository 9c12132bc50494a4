//! Retune (§4.6 "Pitch-drift corrector"): the most algorithmically involved
//! processor, wrapping `signet_dsp::correct_pitch_drift`.
//!
//! Without a grouping regex, every file is corrected independently. With
//! one (§4.6 last paragraph, "identical-processing sets"), files are
//! grouped by filename with the capture group blanked; each group's
//! authority member derives the correction schedule and every other member
//! replays it verbatim, which requires equal frame counts across the group.

use regex::Regex;
use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;
use signet_dsp::identical_processing_set::{group_files, verify_equal_frame_counts};
use signet_dsp::{apply_schedule, build_schedule, AutocorrelationDetector, DriftCorrectorConfig, PitchDetector};

use crate::error::Result;
use crate::processor::Processor;

pub struct Retune {
    config: DriftCorrectorConfig,
    detector: Box<dyn PitchDetector>,
    grouping: Option<(Regex, String)>,
}

impl Retune {
    pub fn new(chunk_ms: f64) -> Self {
        Self {
            config: DriftCorrectorConfig::new(chunk_ms),
            detector: Box::new(AutocorrelationDetector),
            grouping: None,
        }
    }

    /// Configure an identical-processing set: `pattern` must have exactly
    /// one capture group; `authority` is the captured text identifying
    /// which group member's correction every other member must replay.
    pub fn with_identical_processing_set(mut self, pattern: Regex, authority: impl Into<String>) -> Self {
        self.grouping = Some((pattern, authority.into()));
        self
    }
}

impl Processor for Retune {
    fn name(&self) -> &'static str {
        "retune"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        let Some((pattern, authority)) = &self.grouping else {
            for file in collection.iter_mut() {
                let audio = file.audio_mut(loader);
                if let Some(positions) = build_schedule(audio, &self.config, self.detector.as_ref()) {
                    apply_schedule(audio, &positions);
                } else {
                    tracing::warn!("retune: pitch detection unfit, left untouched");
                }
            }
            return Ok(());
        };

        let filenames: Vec<String> = (0..collection.len())
            .map(|i| collection.get(i).unwrap().current_path().file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string())
            .collect();
        let groups = group_files(&filenames, pattern, authority)?;

        for group in groups {
            let Some(authority_idx) = group.authority else {
                tracing::warn!(group = %group.key, "retune: no authority member found for identical-processing group, skipping");
                continue;
            };

            verify_equal_frame_counts(&group, |i| {
                collection.get_mut(i).unwrap().audio_mut(loader).frame_count()
            })?;

            let authority_audio = collection.get_mut(authority_idx).unwrap().audio_mut(loader);
            let Some(positions) = build_schedule(authority_audio, &self.config, self.detector.as_ref()) else {
                tracing::warn!(group = %group.key, "retune: authority member's pitch detection unfit, group left untouched");
                continue;
            };

            for &member in &group.members {
                let audio = collection.get_mut(member).unwrap().audio_mut(loader);
                apply_schedule(audio, &positions);
            }
        }
        Ok(())
    }
}
