//! Trim (§4.5 "Trim").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

/// Removes a fixed number of frames from the start and/or end of every
/// file, re-asserting the §4.2.3 metadata hooks.
pub struct Trim {
    from_start: usize,
    from_end: usize,
}

impl Trim {
    pub fn new(from_start: usize, from_end: usize) -> Self {
        Self { from_start, from_end }
    }
}

impl Processor for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let channels = audio.channel_count as usize;
            let frame_count = audio.frame_count();

            let start = self.from_start.min(frame_count);
            let end = self.from_end.min(frame_count - start);
            let keep_frames = frame_count - start - end;

            audio.samples = audio.samples[start * channels..(start + keep_frames) * channels].to_vec();

            if start > 0 {
                let dropped = audio.metadata.frames_removed_from_start(start);
                if dropped.any() {
                    tracing::warn!("trim: one or more regions/loops/markers were dropped removing frames from the start");
                }
            }
            if end > 0 {
                let dropped = audio.metadata.frames_removed_from_end(audio.frame_count());
                if dropped.any() {
                    tracing::warn!("trim: one or more regions/loops/markers were dropped removing frames from the end");
                }
            }
        }
        Ok(())
    }
}
