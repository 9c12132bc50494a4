//! The file collection (§3 `FileCollection`, §4.4).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::edit_tracked_file::EditTrackedFile;

/// Owns every [`EditTrackedFile`] in a run, plus a folder→indices index
/// rebuilt whenever membership or paths change.
#[derive(Debug, Default)]
pub struct FileCollection {
    files: Vec<EditTrackedFile>,
    folder_index: HashMap<PathBuf, Vec<usize>>,
}

impl FileCollection {
    /// Build a collection from a path set, in the resolver's emission
    /// order.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let files = paths.into_iter().map(EditTrackedFile::new).collect();
        let mut collection = Self {
            files,
            folder_index: HashMap::new(),
        };
        collection.rebuild_index();
        collection
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditTrackedFile> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EditTrackedFile> {
        self.files.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&EditTrackedFile> {
        self.files.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EditTrackedFile> {
        self.files.get_mut(index)
    }

    /// Rebuild the folder→indices index. Must be called after any pass that
    /// edits `current_path`.
    pub fn rebuild_index(&mut self) {
        self.folder_index.clear();
        for (i, f) in self.files.iter().enumerate() {
            let parent = f
                .current_path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            self.folder_index.entry(parent).or_default().push(i);
        }
    }

    /// Indices of files whose current parent directory is `folder`.
    pub fn indices_in_folder(&self, folder: &Path) -> &[usize] {
        self.folder_index
            .get(folder)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `would_writing_conflict` (§4.4): true iff any two files share a
    /// `current_path` after all edits. Logs every conflicting pair.
    pub fn would_writing_conflict(&self) -> bool {
        let mut seen: HashMap<&Path, usize> = HashMap::new();
        let mut conflict = false;
        for (i, f) in self.files.iter().enumerate() {
            if let Some(&other) = seen.get(f.current_path()) {
                tracing::error!(
                    path = %f.current_path().display(),
                    first_index = other,
                    second_index = i,
                    "two files would be written to the same path"
                );
                conflict = true;
            } else {
                seen.insert(f.current_path(), i);
            }
        }
        conflict
    }

    pub fn into_vec(self) -> Vec<EditTrackedFile> {
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_paths_preserves_order() {
        let c = FileCollection::from_paths(vec![PathBuf::from("b.wav"), PathBuf::from("a.wav")]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(0).unwrap().original_path(), Path::new("b.wav"));
    }

    #[test]
    fn no_conflict_when_paths_distinct() {
        let c = FileCollection::from_paths(vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]);
        assert!(!c.would_writing_conflict());
    }

    #[test]
    fn detects_conflict_after_rename() {
        let mut c = FileCollection::from_paths(vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]);
        c.get_mut(1).unwrap().set_path(PathBuf::from("a.wav"));
        assert!(c.would_writing_conflict());
    }

    #[test]
    fn folder_index_groups_by_parent() {
        let mut c = FileCollection::from_paths(vec![
            PathBuf::from("dir1/a.wav"),
            PathBuf::from("dir1/b.wav"),
            PathBuf::from("dir2/c.wav"),
        ]);
        c.rebuild_index();
        assert_eq!(c.indices_in_folder(Path::new("dir1")).len(), 2);
        assert_eq!(c.indices_in_folder(Path::new("dir2")).len(), 1);
    }
}
