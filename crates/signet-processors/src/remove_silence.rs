//! Remove-silence (§4.5 "Remove-silence").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

const PAD_FRAMES: usize = 4;

/// Trims leading/trailing silence (below `threshold_db`), leaving
/// [`PAD_FRAMES`] silent frames on each side.
pub struct RemoveSilence {
    threshold_db: f64,
}

impl RemoveSilence {
    pub fn new(threshold_db: f64) -> Self {
        Self { threshold_db }
    }
}

impl Default for RemoveSilence {
    fn default() -> Self {
        Self::new(-90.0)
    }
}

fn frame_peak(samples: &[f64], frame: usize, channels: usize) -> f64 {
    samples[frame * channels..(frame + 1) * channels]
        .iter()
        .fold(0.0_f64, |acc, s| acc.max(s.abs()))
}

impl Processor for RemoveSilence {
    fn name(&self) -> &'static str {
        "remove-silence"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        let threshold_linear = 10f64.powf(self.threshold_db / 20.0);

        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let channels = audio.channel_count as usize;
            let frame_count = audio.frame_count();
            if frame_count == 0 {
                continue;
            }

            let first_loud = (0..frame_count).find(|&f| frame_peak(&audio.samples, f, channels) > threshold_linear);
            let Some(first_loud) = first_loud else {
                // Entirely silent: nothing to do, matching the conservative
                // no-op rather than deleting the file's content outright.
                continue;
            };
            let last_loud = (0..frame_count)
                .rev()
                .find(|&f| frame_peak(&audio.samples, f, channels) > threshold_linear)
                .unwrap();

            let start = first_loud.saturating_sub(PAD_FRAMES);
            let end = (last_loud + 1 + PAD_FRAMES).min(frame_count);

            if start == 0 && end == frame_count {
                continue;
            }

            audio.samples = audio.samples[start * channels..end * channels].to_vec();

            if start > 0 {
                let dropped = audio.metadata.frames_removed_from_start(start);
                if dropped.any() {
                    tracing::warn!("remove-silence: one or more regions/loops/markers were dropped removing leading silence");
                }
            }
            if end < frame_count {
                let dropped = audio.metadata.frames_removed_from_end(audio.frame_count());
                if dropped.any() {
                    tracing::warn!("remove-silence: one or more regions/loops/markers were dropped removing trailing silence");
                }
            }
        }
        Ok(())
    }
}
