//! Zcross-offset (§11 supplemented processor).
//!
//! Rotates every loop and region's start frame to the nearest zero
//! crossing, keeping the end frame fixed (so `num_frames` absorbs the
//! shift).

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

const SEARCH_WINDOW_FRAMES: usize = 2000;

/// Index of the frame nearest `start` in `mono` where consecutive samples
/// change sign (or touch zero), searched within `SEARCH_WINDOW_FRAMES`.
fn nearest_zero_crossing(mono: &[f64], start: usize) -> usize {
    if mono.is_empty() {
        return start;
    }
    let lo = start.saturating_sub(SEARCH_WINDOW_FRAMES);
    let hi = (start + SEARCH_WINDOW_FRAMES).min(mono.len().saturating_sub(1));

    let mut best = start.min(mono.len() - 1);
    let mut best_distance = usize::MAX;
    for i in lo..hi {
        let crosses = mono[i] == 0.0 || mono[i].signum() != mono[i + 1].signum();
        if crosses {
            let distance = start.abs_diff(i);
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }
    }
    best
}

pub struct ZcrossOffset;

impl Processor for ZcrossOffset {
    fn name(&self) -> &'static str {
        "zcross-offset"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let mono = audio.mix_down_to_mono();

            for l in &mut audio.metadata.loops {
                let end = l.start_frame + l.num_frames;
                let new_start = nearest_zero_crossing(&mono, l.start_frame);
                if new_start < end {
                    l.start_frame = new_start;
                    l.num_frames = end - new_start;
                }
            }
            for r in &mut audio.metadata.regions {
                let end = r.start_frame + r.num_frames;
                let new_start = nearest_zero_crossing(&mono, r.start_frame);
                if new_start < end {
                    r.start_frame = new_start;
                    r.num_frames = end - new_start;
                }
            }
        }
        Ok(())
    }
}
