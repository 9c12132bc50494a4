//! Print-info (§11 supplemented processor).
//!
//! Read-only: logs an `AudioSamples`/`Metadata` summary per file at `info`
//! level rather than mutating anything, the same shape `sonido-cli`'s
//! `Info` subcommand reports.

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

#[derive(Debug, Default, Clone, Copy)]
pub struct PrintInfo;

impl Processor for PrintInfo {
    fn name(&self) -> &'static str {
        "print-info"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let path = file.current_path().to_path_buf();
            let audio = file.audio(loader);
            tracing::info!(
                path = %path.display(),
                container = ?audio.container,
                sample_rate = audio.sample_rate,
                channels = audio.channel_count,
                bits_per_sample = audio.bits_per_sample,
                frame_count = audio.frame_count(),
                peak = audio.peak(),
                rms = audio.rms(),
                loops = audio.metadata.loops.len(),
                markers = audio.metadata.markers.len(),
                regions = audio.metadata.regions.len(),
                midi_root_note = ?audio.metadata.midi_mapping.map(|m| m.root_midi_note),
                "file info"
            );
        }
        Ok(())
    }
}
