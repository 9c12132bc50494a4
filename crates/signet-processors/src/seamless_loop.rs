//! Seamless-loop (§4.5 "Seamless-loop").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

/// Fades the first `percent`% of each file in and the last `percent`% out
/// (both with a sine curve, the same ramp `Fade` uses), adds the faded head
/// onto the faded tail, then drops the leading `percent`% (the blended tail
/// now carries the loop point).
pub struct SeamlessLoop {
    percent: f64,
}

impl SeamlessLoop {
    pub fn new(percent: f64) -> Self {
        Self { percent: percent.clamp(0.0, 50.0) }
    }
}

/// Sine ramp shared with the fade-in/fade-out passes below: `pos` counts
/// frames from the silent end toward the full-volume end, `0..span`.
fn sine_ramp(pos: usize, span: usize) -> f64 {
    let t = pos as f64 / span as f64;
    (t * std::f64::consts::FRAC_PI_2).sin()
}

impl Processor for SeamlessLoop {
    fn name(&self) -> &'static str {
        "seamless-loop"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let channels = audio.channel_count as usize;
            let frame_count = audio.frame_count();
            let span = ((frame_count as f64 * self.percent / 100.0).round() as usize).min(frame_count / 2);
            if span == 0 {
                continue;
            }

            let first: Vec<f64> = audio.samples[0..span * channels].to_vec();
            let last: Vec<f64> = audio.samples[(frame_count - span) * channels..frame_count * channels].to_vec();
            let middle: Vec<f64> = audio.samples[span * channels..(frame_count - span) * channels].to_vec();

            let mut blended = Vec::with_capacity(span * channels);
            for i in 0..span {
                // Head frame `i`, faded in (pos == i from the start of the file).
                let fade_in = sine_ramp(i, span);
                // Tail frame `i` (global frame `frame_count - span + i`),
                // faded out (pos counts back from the file's last frame).
                let fade_out = sine_ramp(span - 1 - i, span);
                for ch in 0..channels {
                    let a = first[i * channels + ch];
                    let b = last[i * channels + ch];
                    blended.push(a * fade_in + b * fade_out);
                }
            }

            audio.samples = middle.into_iter().chain(blended).collect();

            let dropped = audio.metadata.frames_removed_from_start(span);
            if dropped.any() {
                tracing::warn!("seamless-loop: one or more regions/loops/markers were dropped folding the leading span into the loop");
            }
        }
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
            Some(AudioSamples::new((0..100).map(|i| i as f64 / 100.0).collect(), 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    struct ConstantLoader;
    impl AudioLoader for ConstantLoader {
        fn load(&self, _path: &Path) -> Option<AudioSamples> {
            Some(AudioSamples::new(vec![1.0; 100], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn constant_signal_crossfade_stays_within_bounds() {
        // A sine-power crossfade of two unity-gain regions overshoots unity;
        // fading head-in and tail-out before summing keeps the seam closer
        // to the original amplitude than an equal-power crossfade of the
        // raw endpoints would (peaks around 1.3, not 1.41).
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut looper = SeamlessLoop::new(10.0);
        looper.process_files(&mut collection, &ConstantLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        for &s in &audio.samples {
            assert!((s - 1.0).abs() <= 0.4, "sample {s} overshot the crossfade bound");
        }
    }

    #[test]
    fn reduces_frame_count_by_span() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut looper = SeamlessLoop::new(10.0);
        looper.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.frame_count(), 90);
    }

    #[test]
    fn zero_percent_is_a_no_op() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut looper = SeamlessLoop::new(0.0);
        looper.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.frame_count(), 100);
    }
}
