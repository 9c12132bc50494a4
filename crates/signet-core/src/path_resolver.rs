//! The path resolver (§4.1).
//!
//! Expands an ordered list of include/exclude tokens — literal files,
//! literal directories, or glob patterns containing `*`/`**` — into a
//! canonical, de-duplicated set of existing `.wav`/`.flac` files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Flags that change how directory/glob tokens expand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    /// When set, a bare directory token expands transitively rather than
    /// one level deep.
    pub recursive: bool,
}

/// An ordered, de-duplicated set of canonicalized absolute paths (§3
/// `FilePathSet`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePathSet {
    paths: Vec<PathBuf>,
}

impl FilePathSet {
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolve `tokens` (leading `-` = exclusion) into a canonical path set.
    pub fn resolve(tokens: &[String], opts: ResolverOptions) -> Result<Self> {
        let mut include_patterns = Vec::new();
        let mut exclude_patterns = Vec::new();

        for raw in tokens {
            let stripped = strip_quotes(raw);
            if let Some(pattern) = stripped.strip_prefix('-') {
                exclude_patterns.push(pattern.to_string());
            } else {
                include_patterns.push(stripped.to_string());
            }
        }

        let mut included: Vec<PathBuf> = Vec::new();
        for token in &include_patterns {
            included.extend(expand_include_token(token, opts)?);
        }

        // Inclusion filter (§4.1): only .wav/.flac admitted.
        included.retain(|p| has_audio_extension(p));

        // Exclusion pass: remove any path matched by any exclusion pattern
        // against its full generic (forward-slash) path.
        if !exclude_patterns.is_empty() {
            let matchers: Vec<Regex> = exclude_patterns
                .iter()
                .map(|p| glob_to_regex(&normalize_pattern(p)))
                .collect();
            included.retain(|p| {
                let generic = to_generic_path(p);
                !matchers.iter().any(|m| m.is_match(&generic))
            });
        }

        // Canonicalize + de-duplicate, preserving first-seen order.
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for p in included {
            let canonical = p.canonicalize().unwrap_or(p);
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }

        if out.is_empty() {
            return Err(Error::Empty);
        }

        Ok(FilePathSet { paths: out })
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn has_audio_extension(p: &Path) -> bool {
    matches!(
        p.extension().and_then(|e| e.to_str()),
        Some("wav") | Some("flac")
    )
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn normalize_pattern(pattern: &str) -> String {
    let normalized = pattern.replace('\\', "/");
    if normalized.contains('/') {
        normalized
    } else {
        format!("./{normalized}")
    }
}

fn to_generic_path(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

/// Convert a glob pattern segment/path into an anchored regex: `**` matches
/// any run of characters (including `/`), `*` matches any run excluding
/// `/`, everything else is matched literally.
fn glob_to_regex(pattern: &str) -> Regex {
    let mut out = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '*' {
            if i + 1 < chars.len() && chars[i + 1] == '*' {
                out.push_str(".*");
                i += 2;
            } else {
                out.push_str("[^/]*");
                i += 1;
            }
        } else {
            out.push_str(&regex::escape(&chars[i].to_string()));
            i += 1;
        }
    }
    out.push('$');
    Regex::new(&out).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

fn expand_include_token(token: &str, opts: ResolverOptions) -> Result<Vec<PathBuf>> {
    if token.contains('*') {
        return expand_glob(token);
    }

    let path = PathBuf::from(token);
    if path.is_file() {
        return Ok(vec![path]);
    }
    if path.is_dir() {
        return Ok(expand_directory(&path, opts.recursive));
    }

    Err(Error::Unparseable(token.to_string()))
}

fn expand_directory(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if recursive {
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && !path_has_dotfile_component(path, dir) {
                out.push(path.to_path_buf());
            }
        }
    } else if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && !is_dotfile(&path) {
                out.push(path);
            }
        }
    }
    out
}

/// True if any path component from `dir` down to `path` (inclusive) starts
/// with `.`.
fn path_has_dotfile_component(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('.'))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

/// The glob expansion algorithm (§4.1): walk the pattern's `/`-separated
/// segments, narrowing a working set of directories, then enumerate and
/// match files at the final segment.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let normalized = normalize_pattern(pattern);
    let segments: Vec<&str> = normalized.split('/').collect();
    let (dir_segments, final_segment) = segments.split_at(segments.len() - 1);
    let final_segment = final_segment[0];
    let full_matcher = glob_to_regex(&normalized);

    let mut dirs: Vec<PathBuf> = vec![PathBuf::new()];
    for seg in dir_segments {
        if seg.contains("**") {
            let mut next = Vec::new();
            for d in &dirs {
                next.push(d.clone());
                let base = if d.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    d.clone()
                };
                for entry in WalkDir::new(&base)
                    .min_depth(1)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    if entry.file_type().is_dir() && !is_dotfile(entry.path()) {
                        let rel = entry.path().strip_prefix(&base).unwrap_or(entry.path());
                        next.push(d.join(rel));
                    }
                }
            }
            dirs = next;
        } else if seg.contains('*') {
            let seg_matcher = glob_to_regex(seg);
            let mut next = Vec::new();
            for d in &dirs {
                let base = if d.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    d.clone()
                };
                if let Ok(entries) = std::fs::read_dir(&base) {
                    for entry in entries.filter_map(|e| e.ok()) {
                        let path = entry.path();
                        if path.is_dir()
                            && !is_dotfile(&path)
                            && entry
                                .file_name()
                                .to_str()
                                .map(|n| seg_matcher.is_match(n))
                                .unwrap_or(false)
                        {
                            let name = entry.file_name();
                            next.push(d.join(name));
                        }
                    }
                }
            }
            dirs = next;
        } else {
            for d in &mut dirs {
                d.push(seg);
            }
        }
    }

    let recursive_final = final_segment.contains("**");
    let mut results = Vec::new();
    for d in &dirs {
        let base = if d.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            d.clone()
        };
        if !base.is_dir() {
            continue;
        }
        let candidates: Vec<PathBuf> = if recursive_final {
            WalkDir::new(&base)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.path().to_path_buf())
                .collect()
        } else if let Ok(entries) = std::fs::read_dir(&base) {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect()
        } else {
            Vec::new()
        };

        for candidate in candidates {
            if is_dotfile(&candidate) {
                continue;
            }
            let generic = to_generic_path(&candidate);
            // Also try without a leading "./" since patterns may or may not
            // carry it depending on how the caller supplied the token.
            let generic_no_dot = generic.strip_prefix("./").unwrap_or(&generic);
            if full_matcher.is_match(&generic) || full_matcher.is_match(generic_no_dot) {
                results.push(candidate);
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn resolves_literal_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.wav");
        touch(&file);
        let tokens = vec![file.to_string_lossy().to_string()];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn non_audio_extension_is_rejected_by_inclusion_filter() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        touch(&file);
        let tokens = vec![file.to_string_lossy().to_string()];
        let result = FilePathSet::resolve(&tokens, ResolverOptions::default());
        assert!(matches!(result, Err(Error::Empty)));
    }

    #[test]
    fn directory_token_expands_top_level_only_by_default() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.wav"));
        touch(&dir.path().join("sub/b.wav"));
        let tokens = vec![dir.path().to_string_lossy().to_string()];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn directory_token_recursive_flag_descends() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.wav"));
        touch(&dir.path().join("sub/b.wav"));
        let tokens = vec![dir.path().to_string_lossy().to_string()];
        let set = FilePathSet::resolve(&tokens, ResolverOptions { recursive: true }).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn directory_expansion_skips_dotfiles() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.wav"));
        touch(&dir.path().join(".hidden.wav"));
        let tokens = vec![dir.path().to_string_lossy().to_string()];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn star_glob_matches_one_level() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("one.wav"));
        touch(&dir.path().join("two.wav"));
        touch(&dir.path().join("sub/three.wav"));
        let pattern = format!("{}/*.wav", dir.path().to_string_lossy());
        let tokens = vec![pattern];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn doublestar_glob_matches_recursively() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("one.wav"));
        touch(&dir.path().join("sub/two.wav"));
        touch(&dir.path().join("sub/deeper/three.wav"));
        let pattern = format!("{}/**/*.wav", dir.path().to_string_lossy());
        let tokens = vec![pattern];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 2); // ** requires at least the sub dir segment
    }

    #[test]
    fn exclusion_removes_matching_paths() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("keep.wav"));
        touch(&dir.path().join("skip.wav"));
        let include = format!("{}/*.wav", dir.path().to_string_lossy());
        let exclude = format!("-{}/skip.wav", dir.path().to_string_lossy());
        let tokens = vec![include, exclude];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.as_slice()[0].ends_with("keep.wav"));
    }

    #[test]
    fn unparseable_token_errors() {
        let tokens = vec!["/no/such/path/at/all".to_string()];
        let result = FilePathSet::resolve(&tokens, ResolverOptions::default());
        assert!(matches!(result, Err(Error::Unparseable(_))));
    }

    #[test]
    fn empty_selection_errors() {
        let dir = tempdir().unwrap();
        let tokens = vec![dir.path().to_string_lossy().to_string()];
        let result = FilePathSet::resolve(&tokens, ResolverOptions::default());
        assert!(matches!(result, Err(Error::Empty)));
    }

    #[test]
    fn quoted_tokens_are_stripped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.wav");
        touch(&file);
        let tokens = vec![format!("\"{}\"", file.to_string_lossy())];
        let set = FilePathSet::resolve(&tokens, ResolverOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
    }
}
