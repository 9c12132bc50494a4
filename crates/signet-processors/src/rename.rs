//! Rename (§4.5 "Rename").
//!
//! Applies a textual substitution over the filename, replacing `<...>`
//! tokens. Unknown tokens are a hard error rather than being left
//! untouched, so a typo in a batch of thousands of files is caught on the
//! first one instead of silently producing garbage names.

use std::path::PathBuf;

use regex::Regex;
use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;
use signet_dsp::{AutocorrelationDetector, PitchDetectExt, PitchDetector};

use crate::error::{Error, Result};
use crate::processor::Processor;

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

fn midi_note_from_freq(freq: f64) -> i32 {
    (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32
}

fn note_name(midi: i32) -> (String, i32) {
    let index = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    (NOTE_NAMES[index].to_string(), octave)
}

fn alpha_counter(mut n: u64) -> String {
    // 1-based: 1 -> "a", 26 -> "z", 27 -> "aa".
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'a' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn to_snake_case(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::new();
    let mut capitalize_next = false;
    for c in name.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub struct Rename {
    pattern: String,
    token_re: Regex,
    counter: u64,
}

impl Rename {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            token_re: Regex::new(r"<([a-zA-Z0-9-]+)>").unwrap(),
            counter: 0,
        }
    }

    fn resolve_token(
        &self,
        token: &str,
        stem: &str,
        parent_folder: &str,
        counter: u64,
        detected_pitch: Option<f64>,
    ) -> Result<String> {
        match token {
            "counter" => Ok(format!("{counter:03}")),
            "alpha-counter" => Ok(alpha_counter(counter)),
            "parent-folder" => Ok(parent_folder.to_string()),
            "parent-folder-snake" => Ok(to_snake_case(parent_folder)),
            "parent-folder-camel" => Ok(to_camel_case(parent_folder)),
            "detected-pitch" => {
                let pitch = detected_pitch.ok_or_else(|| Error::BadRenamePattern(format!("no detectable pitch for {stem}")))?;
                Ok(format!("{pitch:.2}"))
            }
            "detected-midi-note" => {
                let pitch = detected_pitch.ok_or_else(|| Error::BadRenamePattern(format!("no detectable pitch for {stem}")))?;
                Ok(midi_note_from_freq(pitch).to_string())
            }
            "detected-note" => {
                let pitch = detected_pitch.ok_or_else(|| Error::BadRenamePattern(format!("no detectable pitch for {stem}")))?;
                let (name, octave) = note_name(midi_note_from_freq(pitch));
                Ok(format!("{name}{octave}"))
            }
            "detected-note-no-octave" => {
                let pitch = detected_pitch.ok_or_else(|| Error::BadRenamePattern(format!("no detectable pitch for {stem}")))?;
                let (name, _) = note_name(midi_note_from_freq(pitch));
                Ok(name)
            }
            other => Err(Error::UnknownRenameToken(other.to_string())),
        }
    }

    fn uses_pitch_tokens(&self) -> bool {
        self.token_re.captures_iter(&self.pattern).any(|c| {
            matches!(
                &c[1],
                "detected-pitch" | "detected-midi-note" | "detected-note" | "detected-note-no-octave"
            )
        })
    }
}

impl Processor for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        let needs_pitch = self.uses_pitch_tokens();
        let detector: Box<dyn PitchDetector> = Box::new(AutocorrelationDetector);

        let indices: Vec<usize> = (0..collection.len()).collect();
        for i in indices {
            self.counter += 1;
            let file = collection.get_mut(i).unwrap();
            let current = file.current_path().to_path_buf();
            let stem = current.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
            let ext = current.extension().and_then(|s| s.to_str()).unwrap_or_default().to_string();
            let parent = current.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()).unwrap_or_default().to_string();

            let detected_pitch = if needs_pitch {
                file.audio(loader).detect_pitch(detector.as_ref())
            } else {
                None
            };

            let counter = self.counter;
            let mut resolve_err: Option<Error> = None;
            let pattern = self.pattern.clone();
            let new_stem = self.token_re.replace_all(&pattern, |caps: &regex::Captures<'_>| {
                match self.resolve_token(&caps[1], &stem, &parent, counter, detected_pitch) {
                    Ok(value) => value,
                    Err(e) => {
                        resolve_err = Some(e);
                        String::new()
                    }
                }
            });
            if let Some(e) = resolve_err {
                return Err(e);
            }

            let mut new_path = current.clone();
            new_path.set_file_name(if ext.is_empty() { new_stem.to_string() } else { format!("{new_stem}.{ext}") });
            if new_path != current {
                file.set_path(new_path);
            }
        }
        collection.rebuild_index();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{AudioSamples, ContainerFormat, Metadata};
    use std::path::Path;

    struct FixedLoader;
    impl AudioLoader for FixedLoader {
        fn load(&self, _path: &Path) -> Option<AudioSamples> {
            Some(AudioSamples::new(vec![0.0; 4], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn alpha_counter_wraps_to_double_letters() {
        assert_eq!(alpha_counter(1), "a");
        assert_eq!(alpha_counter(26), "z");
        assert_eq!(alpha_counter(27), "aa");
    }

    #[test]
    fn snake_and_camel_case_conversion() {
        assert_eq!(to_snake_case("My Samples"), "my_samples");
        assert_eq!(to_camel_case("my-samples"), "mySamples");
    }

    #[test]
    fn note_name_for_concert_a() {
        assert_eq!(note_name(69), ("A".to_string(), 4));
    }

    #[test]
    fn counter_token_substitutes_sequentially() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]);
        let mut rename = Rename::new("sample-<counter>");
        rename.process_files(&mut collection, &FixedLoader).unwrap();
        assert_eq!(collection.get(0).unwrap().current_path().file_name().unwrap(), "sample-001.wav");
        assert_eq!(collection.get(1).unwrap().current_path().file_name().unwrap(), "sample-002.wav");
    }

    #[test]
    fn unknown_token_is_an_error() {
        let mut collection = FileCollection::from_paths(vec![PathBuf::from("a.wav")]);
        let mut rename = Rename::new("<nonsense>");
        assert!(rename.process_files(&mut collection, &FixedLoader).is_err());
    }
}
