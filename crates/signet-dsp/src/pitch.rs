//! Monophonic pitch estimation (§4.2.3 `detect_pitch`).
//!
//! The spec calls the pitch estimator itself an oracle — "the source ties
//! to a specific waveform-period tracker, but any monophonic pitch
//! estimator with comparable accuracy suffices". [`PitchDetector`] names
//! that seam; [`AutocorrelationDetector`] is a real, if modest,
//! implementation (normalized autocorrelation with parabolic peak
//! interpolation) standing in for it. The weighting and octave-correction
//! logic around it is Signet's own and lives in [`PitchDetectExt::detect_pitch`].

use signet_core::AudioSamples;

/// Estimates the fundamental frequency, in Hz, of one short monophonic
/// chunk. Returns 0.0 for silence or unpitched (noisy) content.
pub trait PitchDetector {
    fn detect_chunk(&self, mono: &[f64], sample_rate: u32) -> f64;
}

/// Normalized-autocorrelation pitch tracker, searching the lag range
/// corresponding to 50–1500 Hz.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutocorrelationDetector;

impl PitchDetector for AutocorrelationDetector {
    fn detect_chunk(&self, mono: &[f64], sample_rate: u32) -> f64 {
        if mono.len() < 4 {
            return 0.0;
        }
        let min_lag = (sample_rate as f64 / 1500.0).floor().max(1.0) as usize;
        let max_lag = (sample_rate as f64 / 50.0).ceil() as usize;
        let max_lag = max_lag.min(mono.len() - 1);
        if min_lag >= max_lag {
            return 0.0;
        }

        let energy: f64 = mono.iter().map(|s| s * s).sum();
        if energy < 1e-9 {
            return 0.0;
        }

        let mut best_lag = 0usize;
        let mut best_corr = 0.0f64;
        for lag in min_lag..=max_lag {
            let mut corr = 0.0;
            for i in 0..mono.len() - lag {
                corr += mono[i] * mono[i + lag];
            }
            let normalized = corr / energy;
            if normalized > best_corr {
                best_corr = normalized;
                best_lag = lag;
            }
        }

        if best_lag == 0 || best_corr < 0.3 {
            return 0.0;
        }

        // Parabolic interpolation around the best lag for sub-sample
        // precision.
        let refined_lag = if best_lag > min_lag && best_lag < max_lag {
            let corr_at = |lag: usize| -> f64 {
                (0..mono.len() - lag).map(|i| mono[i] * mono[i + lag]).sum::<f64>() / energy
            };
            let c_prev = corr_at(best_lag - 1);
            let c_curr = best_corr;
            let c_next = corr_at(best_lag + 1);
            let denom = c_prev - 2.0 * c_curr + c_next;
            if denom.abs() > 1e-9 {
                best_lag as f64 + 0.5 * (c_prev - c_next) / denom
            } else {
                best_lag as f64
            }
        } else {
            best_lag as f64
        };

        sample_rate as f64 / refined_lag
    }
}

fn cents(a: f64, b: f64) -> f64 {
    1200.0 * (a / b).log2()
}

fn rms(chunk: &[f64]) -> f64 {
    if chunk.is_empty() {
        return 0.0;
    }
    (chunk.iter().map(|s| s * s).sum::<f64>() / chunk.len() as f64).sqrt()
}

fn gaussian_kernel(distance: f64, height: f64, sigma: f64) -> f64 {
    height * (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}

/// Extension trait adding `detect_pitch` to [`AudioSamples`].
pub trait PitchDetectExt {
    fn detect_pitch(&self, detector: &dyn PitchDetector) -> Option<f64>;
}

impl PitchDetectExt for AudioSamples {
    fn detect_pitch(&self, detector: &dyn PitchDetector) -> Option<f64> {
        let mono = self.mix_down_to_mono();
        let peak = mono.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
        if peak < 1e-12 {
            return None;
        }
        let normalized: Vec<f64> = mono.iter().map(|s| s / peak).collect();

        let chunk_frames = (self.sample_rate as f64 * 0.1).round().max(1.0) as usize;
        let chunks: Vec<&[f64]> = normalized.chunks(chunk_frames).collect();
        if chunks.is_empty() {
            return None;
        }

        let pitches: Vec<f64> = chunks
            .iter()
            .map(|c| detector.detect_chunk(c, self.sample_rate))
            .collect();
        let rmses: Vec<f64> = chunks.iter().map(|c| rms(c)).collect();
        let max_rms = rmses.iter().cloned().fold(0.0_f64, f64::max).max(1e-12);

        let weights: Vec<f64> = pitches
            .iter()
            .enumerate()
            .map(|(i, &p_i)| {
                if p_i <= 0.0 {
                    return 0.0;
                }
                let proximity: f64 = pitches
                    .iter()
                    .filter(|&&p_j| p_j > 0.0)
                    .map(|&p_j| gaussian_kernel(cents(p_i, p_j), 10.0, 0.9))
                    .sum();
                let rms_rel = rmses[i] / max_rms;
                let boost = 1.0 + (std::f64::consts::FRAC_PI_2 * (1.0 - rms_rel)).cos() * 1.5;
                proximity * boost
            })
            .collect();

        let (best_idx, &best_weight) = weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        if best_weight <= 0.0 || pitches[best_idx] <= 0.0 {
            return None;
        }
        let base_pitch = pitches[best_idx];

        // Octave-error correction: test the base estimate against its
        // octave-related candidates, voting with every other chunk's
        // detected pitch that lands within 3 Hz of a candidate.
        let octave_shifts = [0.25, 0.5, 1.0, 2.0, 4.0];
        let mut best_candidate = base_pitch;
        let mut best_votes = 0usize;
        for &mult in &octave_shifts {
            let candidate = base_pitch * mult;
            let votes = pitches
                .iter()
                .filter(|&&p| p > 0.0 && (p - candidate).abs() <= 3.0)
                .count();
            if votes > best_votes {
                best_votes = votes;
                best_candidate = candidate;
            }
        }

        Some(best_candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{ContainerFormat, Metadata};

    fn sine(frames: usize, rate: u32, freq: f64) -> Vec<f64> {
        (0..frames)
            .map(|i| (i as f64 / rate as f64 * freq * std::f64::consts::TAU).sin())
            .collect()
    }

    #[test]
    fn autocorrelation_detects_known_frequency() {
        let chunk = sine(4410, 44100, 440.0);
        let detector = AutocorrelationDetector;
        let pitch = detector.detect_chunk(&chunk, 44100);
        assert!((pitch - 440.0).abs() < 5.0, "got {pitch}");
    }

    #[test]
    fn silence_has_no_pitch() {
        let detector = AutocorrelationDetector;
        let pitch = detector.detect_chunk(&vec![0.0; 4410], 44100);
        assert_eq!(pitch, 0.0);
    }

    #[test]
    fn detect_pitch_on_steady_tone() {
        let audio = AudioSamples::new(sine(44100, 44100, 440.0), 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let detected = audio.detect_pitch(&AutocorrelationDetector).unwrap();
        assert!((detected - 440.0).abs() < 5.0, "got {detected}");
    }

    #[test]
    fn detect_pitch_returns_none_for_silence() {
        let audio = AudioSamples::new(vec![0.0; 44100], 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        assert!(audio.detect_pitch(&AutocorrelationDetector).is_none());
    }

    #[test]
    fn cents_is_zero_for_equal_pitches() {
        assert_eq!(cents(440.0, 440.0), 0.0);
    }
}
