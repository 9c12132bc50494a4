//! Fade (§4.5 "Fade").

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;

use crate::error::Result;
use crate::processor::Processor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCurve {
    Linear,
    Sine,
    SCurve,
    Exp,
    Log,
    Sqrt,
}

impl FadeCurve {
    /// `t ∈ [0, 1]` maps to an envelope value in `[0, 1]`; endpoints are
    /// always exactly 0 and 1 (§4.5).
    fn envelope(&self, t: f64) -> f64 {
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Sine => (t * std::f64::consts::FRAC_PI_2).sin(),
            FadeCurve::SCurve => t * t * (3.0 - 2.0 * t),
            FadeCurve::Exp => {
                if t <= 0.0 {
                    0.0
                } else {
                    (10f64.powf(t) - 1.0) / 9.0
                }
            }
            FadeCurve::Log => {
                if t >= 1.0 {
                    1.0
                } else if t <= 0.0 {
                    0.0
                } else {
                    1.0 + (t * 9.0 + 1.0).log10() - 1.0
                }
            }
            FadeCurve::Sqrt => t.sqrt(),
        }
    }
}

/// Fades `duration_frames` worth of audio in or out at the start or end of
/// every file.
pub struct Fade {
    direction: FadeDirection,
    curve: FadeCurve,
    duration_frames: usize,
}

impl Fade {
    pub fn new(direction: FadeDirection, curve: FadeCurve, duration_frames: usize) -> Self {
        Self { direction, curve, duration_frames }
    }
}

impl Processor for Fade {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let frame_count = audio.frame_count();
            let channels = audio.channel_count as usize;
            let span = self.duration_frames.min(frame_count);
            if span == 0 {
                continue;
            }

            // `pos` counts frames from the silent end of the region toward
            // the full-volume end, so both directions share one ramp:
            // `0, 1/span, …, (span-1)/span`, with full volume reached only
            // at the untouched frame just past the region (§4.5).
            for pos in 0..span {
                let t = pos as f64 / span as f64;
                let env = self.curve.envelope(t);
                let frame = match self.direction {
                    FadeDirection::In => pos,
                    FadeDirection::Out => frame_count - 1 - pos,
                };
                for ch in 0..channels {
                    audio.samples[frame * channels + ch] *= env;
                }
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
            Some(AudioSamples::new(vec![1.0; 10], 1, 44100, 16, ContainerFormat::Wav, Metadata::default()))
        }
    }

    #[test]
    fn linear_envelope_endpoints() {
        assert_eq!(FadeCurve::Linear.envelope(0.0), 0.0);
        assert_eq!(FadeCurve::Linear.envelope(1.0), 1.0);
    }

    #[test]
    fn fade_in_zeroes_first_frame() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut fade = Fade::new(FadeDirection::In, FadeCurve::Linear, 5);
        fade.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.samples[0], 0.0);
        assert!(audio.samples[2] > 0.0 && audio.samples[2] < 1.0);
        // Last in-region frame stays strictly below full volume; the frame
        // just past the region (index 5, untouched) is where it's reached.
        assert_eq!(audio.samples[4], 0.8);
        assert_eq!(audio.samples[9], 1.0);
    }

    #[test]
    fn fade_out_zeroes_last_frame() {
        let mut collection = FileCollection::from_paths(vec![std::path::PathBuf::from("a.wav")]);
        let mut fade = Fade::new(FadeDirection::Out, FadeCurve::Linear, 5);
        fade.process_files(&mut collection, &FixedLoader).unwrap();
        let audio = collection.get_mut(0).unwrap().peek_audio().unwrap();
        assert_eq!(audio.samples[0], 1.0);
        // First in-region frame (index 5) stays strictly below full volume.
        assert_eq!(audio.samples[5], 0.8);
        assert_eq!(audio.samples[9], 0.0);
    }
}
