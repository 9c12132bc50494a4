//! Folderise (§4.5 "Folderise").

use regex::Regex;
use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

/// Matches the filename against `pattern`; on match, moves the file into a
/// folder named by expanding `<n>` (regex group `n`) in `folder_template`.
pub struct Folderise {
    pattern: Regex,
    folder_template: String,
    group_token_re: Regex,
}

impl Folderise {
    pub fn new(pattern: &str, folder_template: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            folder_template: folder_template.into(),
            group_token_re: Regex::new(r"<(\d+)>").unwrap(),
        })
    }
}

impl Processor for Folderise {
    fn name(&self) -> &'static str {
        "folderise"
    }

    fn process_files(&mut self, collection: &mut FileCollection, _loader: &dyn AudioLoader) -> Result<()> {
        for i in 0..collection.len() {
            let file = collection.get_mut(i).unwrap();
            let current = file.current_path().to_path_buf();
            let filename = current.file_name().and_then(|n| n.to_str()).unwrap_or_default();

            let Some(caps) = self.pattern.captures(filename) else {
                continue;
            };

            let folder = self.group_token_re.replace_all(&self.folder_template, |m: &regex::Captures<'_>| {
                let group: usize = m[1].parse().unwrap_or(0);
                caps.get(group).map(|g| g.as_str().to_string()).unwrap_or_default()
            });

            let parent = current.parent().unwrap_or_else(|| std::path::Path::new(""));
            let new_path = parent.join(folder.as_ref()).join(current.file_name().unwrap());
            file.set_path(new_path);
        }
        collection.rebuild_index();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{AudioSamples, ContainerFormat, Metadata};
    use std::path::{Path, PathBuf};

    struct FixedLoader;
    impl AudioLoader for FixedLoader {
        fn load(&self, _path: &Path) -> Option<AudioSamples> {
            Some(AudioSamples::new(vec![0.0; 4], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn moves_matching_files_into_templated_folder() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("kick-C2.wav"), PathBuf::from("snare.wav")]);
        let mut folderise = Folderise::new(r"^(\w+)-([A-G]\d)\.wav$", "<2>").unwrap();
        folderise.process_files(&mut collection, &FixedLoader).unwrap();
        assert_eq!(collection.get(0).unwrap().current_path(), Path::new("C2/kick-C2.wav"));
        // snare.wav doesn't match, left alone.
        assert_eq!(collection.get(1).unwrap().current_path(), Path::new("snare.wav"));
    }
}
