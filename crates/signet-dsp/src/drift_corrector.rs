//! Pitch-drift corrector (§4.6): the most algorithmically involved
//! processor, used as the representative of Signet's "real" DSP work.
//!
//! Chunk-wise pitch detection, outlier smoothing, ignore-region marking,
//! per-region target banding, and a smoothed-ratio cubic-interpolation
//! retune pass. The retune schedule is derived once from the mono mix and
//! then replayed against every channel, so stereo files stay phase-aligned.

use signet_core::AudioSamples;

use crate::pitch::PitchDetector;
use crate::resample::{deinterleave, interleave, sample_at};

/// User-configurable chunk size in milliseconds, clamped to the spec's
/// documented 20–200 ms range.
#[derive(Debug, Clone, Copy)]
pub struct DriftCorrectorConfig {
    pub chunk_ms: f64,
}

impl Default for DriftCorrectorConfig {
    fn default() -> Self {
        Self { chunk_ms: 60.0 }
    }
}

impl DriftCorrectorConfig {
    pub fn new(chunk_ms: f64) -> Self {
        Self {
            chunk_ms: chunk_ms.clamp(20.0, 200.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Chunk {
    frame_start: usize,
    frame_size: usize,
    detected_pitch: f64,
    outlier: bool,
    ignore: bool,
    target_pitch: f64,
    ratio_at_chunk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftResult {
    /// Fewer than 75% of chunks carried a detectable pitch; left untouched.
    Unfit,
    Corrected {
        frames_before: usize,
        frames_after: usize,
    },
}

fn cents(a: f64, b: f64) -> f64 {
    1200.0 * (a / b).log2()
}

fn build_chunks(mono: &[f64], chunk_frames: usize, sample_rate: u32, detector: &dyn PitchDetector) -> Vec<Chunk> {
    mono.chunks(chunk_frames)
        .enumerate()
        .map(|(i, chunk)| Chunk {
            frame_start: i * chunk_frames,
            frame_size: chunk.len(),
            detected_pitch: detector.detect_chunk(chunk, sample_rate),
            outlier: false,
            ignore: false,
            target_pitch: 0.0,
            ratio_at_chunk: 1.0,
        })
        .collect()
}

/// Erase single-chunk detector spikes inside otherwise-stable regions.
fn smooth_outliers(chunks: &mut [Chunk]) {
    for i in 2..chunks.len() {
        let (p0, p1, p2) = (chunks[i - 2].detected_pitch, chunks[i - 1].detected_pitch, chunks[i].detected_pitch);
        let deviation = if p1.min(p2) <= 0.0 {
            f64::MAX
        } else {
            p1.max(p2) / p1.min(p2)
        };
        let stable_before = p0 > 0.0 && p1 > 0.0 && cents(p1, p0).abs() < 3.0;
        if deviation > 1.006 && stable_before {
            chunks[i].detected_pitch = p1;
        }
    }
}

/// Mark chunks whose pitch deviates ≥3 cents from a centered 5-chunk mean.
fn mark_outliers(chunks: &mut [Chunk]) {
    let n = chunks.len();
    for i in 0..n {
        if chunks[i].detected_pitch <= 0.0 {
            chunks[i].outlier = true;
            continue;
        }
        let lo = i.saturating_sub(2);
        let hi = (i + 2).min(n - 1);
        let window = &chunks[lo..=hi];
        let mean = window.iter().map(|c| c.detected_pitch).sum::<f64>() / window.len() as f64;
        chunks[i].outlier = mean <= 0.0 || cents(chunks[i].detected_pitch, mean).abs() >= 3.0;
    }
}

/// A maximal run of consecutive chunks sharing the same `outlier` flag.
struct Run {
    start: usize,
    len: usize,
    outlier: bool,
}

fn find_runs(chunks: &[Chunk]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < chunks.len() {
        let outlier = chunks[i].outlier;
        let start = i;
        while i < chunks.len() && chunks[i].outlier == outlier {
            i += 1;
        }
        runs.push(Run {
            start,
            len: i - start,
            outlier,
        });
    }
    runs
}

/// A chunk is ignored for tuning iff it lies in a maximal run of ≥4
/// consecutive outlier chunks bounded on each side either by the file ends
/// or by ≥7 consecutive non-outlier chunks (§4.6).
fn mark_ignore_regions(chunks: &mut [Chunk]) {
    let runs = find_runs(chunks);
    let mut ignored_run_indices = Vec::new();

    for (idx, run) in runs.iter().enumerate() {
        if !run.outlier || run.len < 4 {
            continue;
        }
        let left_ok = idx == 0 || (runs[idx - 1].len >= 7);
        let right_ok = idx + 1 == runs.len() || (runs[idx + 1].len >= 7);
        if left_ok && right_ok {
            ignored_run_indices.push(idx);
            for chunk in &mut chunks[run.start..run.start + run.len] {
                chunk.ignore = true;
            }
        }
    }

    // Absorb a short non-outlier run at the very start of the file into the
    // ignore region that immediately follows it.
    if let Some(first) = runs.first() {
        if !first.outlier && first.len < 7 && runs.len() > 1 && ignored_run_indices.contains(&1) {
            for chunk in &mut chunks[first.start..first.start + first.len] {
                chunk.ignore = true;
            }
        }
    }
}

/// Partition a non-ignore region's pitch range into five bands, find the
/// mode band, and set every chunk in the region to that band's mean pitch.
fn assign_target_pitches(chunks: &mut [Chunk]) {
    let n = chunks.len();
    let mut i = 0;
    while i < n {
        if chunks[i].ignore {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && !chunks[i].ignore {
            i += 1;
        }
        let region = start..i;

        let pitched: Vec<f64> = chunks[region.clone()]
            .iter()
            .map(|c| c.detected_pitch)
            .filter(|&p| p > 0.0)
            .collect();
        if pitched.is_empty() {
            continue;
        }
        let min_p = pitched.iter().cloned().fold(f64::MAX, f64::min);
        let max_p = pitched.iter().cloned().fold(f64::MIN, f64::max);
        let span = (max_p - min_p).max(1e-9);
        let band_of = |p: f64| -> usize { (((p - min_p) / span) * 5.0).floor().min(4.0) as usize };

        let mut band_counts = [0usize; 5];
        for &p in &pitched {
            band_counts[band_of(p)] += 1;
        }
        let mode_band = band_counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, count)| *count)
            .map(|(band, _)| band)
            .unwrap_or(0);

        let mode_values: Vec<f64> = pitched.iter().cloned().filter(|&p| band_of(p) == mode_band).collect();
        let target = mode_values.iter().sum::<f64>() / mode_values.len().max(1) as f64;

        for chunk in &mut chunks[region] {
            chunk.target_pitch = target;
        }
    }
}

/// Build the per-output-frame source position schedule driven by a
/// first-order low-pass-smoothed pitch ratio (§4.6).
fn build_position_schedule(chunks: &[Chunk], chunk_frames: usize, frame_count: usize) -> Vec<f64> {
    const CUTOFF: f64 = 0.00007;
    let mut positions = Vec::new();
    let mut r = 1.0;
    let mut pos = 0.0;
    let mut last_chunk_idx = usize::MAX;
    let mut target_ratio = 1.0;

    while pos <= (frame_count as f64 - 1.0) {
        let chunk_idx = ((pos as usize) / chunk_frames.max(1)).min(chunks.len().saturating_sub(1));
        if chunk_idx != last_chunk_idx {
            last_chunk_idx = chunk_idx;
            let c = &chunks[chunk_idx];
            target_ratio = if c.ignore || c.detected_pitch <= 0.0 || c.target_pitch <= 0.0 {
                1.0
            } else {
                2f64.powf(cents(c.detected_pitch, c.target_pitch) / 1200.0)
            };
        }
        r += CUTOFF * (target_ratio - r);
        positions.push(pos);
        pos += r;
    }
    positions
}

/// The cubic interpolation the retune pass resamples through (§4.6,
/// `spec.md:193`): not Catmull-Rom (see `resample::cubic_interpolate`), but
/// the specific formula the pitch-drift corrector is defined against.
fn retune_cubic_interpolate(a_m1: f64, a0: f64, a1: f64, a2: f64, t: f64) -> f64 {
    (a0 + (((a2 - a_m1 - 3.0 * a1 + 3.0 * a0) * t + 3.0 * (a1 + a_m1 - 2.0 * a0)) * t
        - (a2 + 2.0 * a_m1 - 6.0 * a1 + 3.0 * a0))
        * t
        / 6.0)
}

fn resample_channel_with_schedule(channel: &[f64], positions: &[f64]) -> Vec<f64> {
    positions
        .iter()
        .map(|&pos| {
            let i0 = pos.floor() as isize;
            let t = pos - i0 as f64;
            retune_cubic_interpolate(
                sample_at(channel, i0 - 1),
                sample_at(channel, i0),
                sample_at(channel, i0 + 1),
                sample_at(channel, i0 + 2),
                t,
            )
        })
        .collect()
}

/// Derive the per-output-frame source-position schedule for `audio` without
/// applying it. Returns `None` when fewer than 75% of chunks carry a
/// detectable pitch (§4.6 viability gate).
///
/// Exposed separately from [`correct_pitch_drift`] so an identical-processing
/// set (§4.6 last paragraph) can derive the schedule once from its authority
/// member and replay the exact same schedule against every other member via
/// [`apply_schedule`].
pub fn build_schedule(audio: &AudioSamples, config: &DriftCorrectorConfig, detector: &dyn PitchDetector) -> Option<Vec<f64>> {
    let frame_count = audio.frame_count();
    if frame_count == 0 {
        return None;
    }

    let mono = audio.mix_down_to_mono();
    let chunk_frames = ((config.chunk_ms / 1000.0) * audio.sample_rate as f64).round().max(1.0) as usize;
    let mut chunks = build_chunks(&mono, chunk_frames, audio.sample_rate, detector);

    let nonzero = chunks.iter().filter(|c| c.detected_pitch > 0.0).count();
    if (nonzero as f64 / chunks.len() as f64) < 0.75 {
        return None;
    }

    smooth_outliers(&mut chunks);
    mark_outliers(&mut chunks);
    mark_ignore_regions(&mut chunks);
    assign_target_pitches(&mut chunks);

    for chunk in &mut chunks {
        chunk.ratio_at_chunk = if chunk.ignore || chunk.detected_pitch <= 0.0 || chunk.target_pitch <= 0.0 {
            1.0
        } else {
            2f64.powf(cents(chunk.detected_pitch, chunk.target_pitch) / 1200.0)
        };
    }

    Some(build_position_schedule(&chunks, chunk_frames, frame_count))
}

/// Resample every channel of `audio` through an already-derived `positions`
/// schedule (as returned by [`build_schedule`]) and update its metadata for
/// the resulting frame-count change.
pub fn apply_schedule(audio: &mut AudioSamples, positions: &[f64]) -> DriftResult {
    let frame_count = audio.frame_count();
    let channels = deinterleave(&audio.samples, audio.channel_count as usize);
    let resampled: Vec<Vec<f64>> = channels.iter().map(|c| resample_channel_with_schedule(c, positions)).collect();
    audio.samples = interleave(&resampled);

    let new_frame_count = positions.len();
    let factor = new_frame_count as f64 / frame_count.max(1) as f64;
    let dropped = audio.metadata.was_stretched(factor, new_frame_count);
    if dropped.any() {
        tracing::warn!("one or more regions/loops/markers were dropped by the pitch-drift corrector");
    }

    DriftResult::Corrected {
        frames_before: frame_count,
        frames_after: new_frame_count,
    }
}

/// Run the full pitch-drift corrector over `audio` in place.
pub fn correct_pitch_drift(
    audio: &mut AudioSamples,
    config: &DriftCorrectorConfig,
    detector: &dyn PitchDetector,
) -> DriftResult {
    let Some(positions) = build_schedule(audio, config, detector) else {
        return DriftResult::Unfit;
    };
    apply_schedule(audio, &positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::AutocorrelationDetector;
    use signet_core::{ContainerFormat, Metadata};

    fn sine(frames: usize, rate: u32, freq: f64) -> Vec<f64> {
        (0..frames)
            .map(|i| (i as f64 / rate as f64 * freq * std::f64::consts::TAU).sin())
            .collect()
    }

    #[test]
    fn silence_is_unfit() {
        let mut audio = AudioSamples::new(vec![0.0; 44100], 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let result = correct_pitch_drift(&mut audio, &DriftCorrectorConfig::default(), &AutocorrelationDetector);
        assert_eq!(result, DriftResult::Unfit);
    }

    #[test]
    fn steady_tone_corrects_without_crashing() {
        let mut audio = AudioSamples::new(sine(44100, 44100, 440.0), 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let result = correct_pitch_drift(&mut audio, &DriftCorrectorConfig::default(), &AutocorrelationDetector);
        match result {
            DriftResult::Corrected { frames_before, frames_after } => {
                assert_eq!(frames_before, 44100);
                assert!(frames_after > 0);
                assert!(audio.samples.iter().all(|s| s.is_finite()));
            }
            DriftResult::Unfit => panic!("a steady 440 Hz tone should be viable"),
        }
    }

    #[test]
    fn retune_cubic_interpolate_reproduces_a_linear_ramp() {
        // Four points of a straight line: the spec cubic (like any
        // interpolating cubic through collinear points) must fall back to
        // plain linear interpolation between a0 and a1.
        for &t in &[0.0, 0.25, 0.5, 0.75, 1.0] {
            let got = retune_cubic_interpolate(-1.0, 0.0, 1.0, 2.0, t);
            assert!((got - t).abs() < 1e-9, "t={t} got={got}");
        }
    }

    #[test]
    fn retune_cubic_interpolate_holds_a_constant_signal() {
        assert_eq!(retune_cubic_interpolate(3.0, 3.0, 3.0, 3.0, 0.37), 3.0);
    }

    #[test]
    fn config_clamps_chunk_ms_to_documented_range() {
        assert_eq!(DriftCorrectorConfig::new(5.0).chunk_ms, 20.0);
        assert_eq!(DriftCorrectorConfig::new(500.0).chunk_ms, 200.0);
    }

    #[test]
    fn find_runs_groups_consecutive_flags() {
        let mut chunks = build_chunks(&vec![0.0; 100], 10, 44100, &AutocorrelationDetector);
        chunks[0].outlier = true;
        chunks[1].outlier = true;
        chunks[2].outlier = false;
        let runs = find_runs(&chunks[..3]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len, 2);
        assert_eq!(runs[1].len, 1);
    }
}
