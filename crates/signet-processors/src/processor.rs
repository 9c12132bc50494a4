//! The processor interface (§4.5).

use signet_backup::BackupJournal;
use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;

/// One edit operation in a run. Processors see the same collection, in the
/// order declared on the command line, and may mutate audio, metadata, or
/// `current_path` on any file.
pub trait Processor {
    fn name(&self) -> &'static str;

    /// Hints for the outer CLI about valid output-location flags; not used
    /// by the core itself.
    fn allows_output_folder(&self) -> bool {
        false
    }

    fn allows_single_output_file(&self) -> bool {
        false
    }

    /// A mutating pass over existing files.
    fn process_files(&mut self, _collection: &mut FileCollection, _loader: &dyn AudioLoader) -> Result<()> {
        Ok(())
    }

    /// A pass that creates new files (e.g. sample-blending), journaling
    /// each one it creates.
    fn generate_files(
        &mut self,
        _collection: &mut FileCollection,
        _journal: &mut BackupJournal,
        _loader: &dyn AudioLoader,
    ) -> Result<()> {
        Ok(())
    }
}
