//! The neutral, container-independent metadata record (§3 `Metadata`).
//!
//! Every WAV/FLAC-specific chunk or block that carries sampler, loop,
//! marker, region, or timing information is *lifted* into this record by
//! `signet-codec` on read, and *lowered* back into wire format on write.
//! Opaque, never-edited chunk bytes are kept by the codec layer alongside
//! this record, not inside it.

use serde::{Deserialize, Serialize};

/// How a loop plays back once its end is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopType {
    Forward,
    Backward,
    PingPong,
}

/// A single sustain/release loop point, in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub name: Option<String>,
    pub loop_type: LoopType,
    pub start_frame: usize,
    pub num_frames: usize,
    /// 0 means infinite.
    pub num_times_to_loop: u32,
}

/// A single cue-point-style marker, in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: Option<String>,
    pub start_frame: usize,
}

/// A named span of frames, optionally referencing the marker it was derived
/// from (WAV labelled-cue regions carry this back-reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub initial_marker_name: Option<String>,
    pub name: Option<String>,
    pub start_frame: usize,
    pub num_frames: usize,
}

/// Per-key sampler zone mapping (low/high note & velocity, fine tune, gain).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerMapping {
    /// -50..=50
    pub fine_tune_cents: i32,
    /// -64..=64
    pub gain_db: i32,
    /// 0..=127
    pub low_note: u8,
    /// 0..=127
    pub high_note: u8,
    /// 1..=127
    pub low_velocity: u8,
    /// 1..=127
    pub high_velocity: u8,
}

impl Default for SamplerMapping {
    fn default() -> Self {
        Self {
            fine_tune_cents: 0,
            gain_db: 0,
            low_note: 0,
            high_note: 127,
            low_velocity: 1,
            high_velocity: 127,
        }
    }
}

impl SamplerMapping {
    /// Clamp every field to its documented range (§3).
    pub fn clamp(&mut self) {
        self.fine_tune_cents = self.fine_tune_cents.clamp(-50, 50);
        self.gain_db = self.gain_db.clamp(-64, 64);
        self.low_note = self.low_note.min(127);
        self.high_note = self.high_note.min(127);
        self.low_velocity = self.low_velocity.clamp(1, 127);
        self.high_velocity = self.high_velocity.clamp(1, 127);
    }
}

/// Root-note MIDI mapping, optionally carrying a full sampler zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MidiMapping {
    /// 0..=127
    pub root_midi_note: u8,
    pub sampler_mapping: Option<SamplerMapping>,
}

/// Whether a file is meant to be played once or looped, plus tempo metadata
/// (lifted from WAV `acid` chunks).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackType {
    OneShot,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingInfo {
    pub playback_type: PlaybackType,
    pub num_beats: u32,
    pub time_sig_num: u16,
    pub time_sig_den: u16,
    pub tempo_bpm: f64,
}

/// The neutral, editable metadata record carried by [`crate::AudioSamples`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub midi_mapping: Option<MidiMapping>,
    pub timing_info: Option<TimingInfo>,
    pub loops: Vec<Loop>,
    pub markers: Vec<Marker>,
    pub regions: Vec<Region>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.midi_mapping.is_none()
            && self.timing_info.is_none()
            && self.loops.is_empty()
            && self.markers.is_empty()
            && self.regions.is_empty()
    }

    /// Re-assert the §3 frame-bound invariants against `frame_count`,
    /// dropping any loop/region/marker that no longer fits. Returns the
    /// number of entries dropped per category, for per-category warnings.
    pub fn enforce_frame_bounds(&mut self, frame_count: usize) -> DroppedCounts {
        let mut dropped = DroppedCounts::default();

        let before = self.loops.len();
        self.loops.retain(|l| {
            l.start_frame < frame_count && l.start_frame + l.num_frames <= frame_count
        });
        dropped.loops = before - self.loops.len();

        let before = self.regions.len();
        self.regions.retain(|r| {
            r.start_frame < frame_count && r.start_frame + r.num_frames <= frame_count
        });
        dropped.regions = before - self.regions.len();

        let before = self.markers.len();
        self.markers.retain(|m| m.start_frame < frame_count);
        dropped.markers = before - self.markers.len();

        dropped
    }

    /// `metadata_was_stretched` (§4.2.3): scale every frame-count-bearing
    /// field by `factor`, floor-toward-zero, then re-assert invariants.
    pub fn was_stretched(&mut self, factor: f64, new_frame_count: usize) -> DroppedCounts {
        let scale = |v: usize| -> usize { ((v as f64) * factor).trunc().max(0.0) as usize };

        for l in &mut self.loops {
            l.start_frame = scale(l.start_frame);
            l.num_frames = scale(l.num_frames).max(1);
        }
        for r in &mut self.regions {
            r.start_frame = scale(r.start_frame);
            r.num_frames = scale(r.num_frames).max(1);
        }
        for m in &mut self.markers {
            m.start_frame = scale(m.start_frame);
        }

        self.enforce_frame_bounds(new_frame_count)
    }

    /// `frames_were_removed_from_start` (§4.2.3).
    pub fn frames_removed_from_start(&mut self, n: usize) -> DroppedCounts {
        let mut dropped = DroppedCounts::default();

        let before = self.loops.len();
        self.loops.retain_mut(|l| {
            if l.start_frame < n {
                false
            } else {
                l.start_frame -= n;
                true
            }
        });
        dropped.loops = before - self.loops.len();

        let before = self.regions.len();
        self.regions.retain_mut(|r| {
            if r.start_frame < n {
                false
            } else {
                r.start_frame -= n;
                true
            }
        });
        dropped.regions = before - self.regions.len();

        let before = self.markers.len();
        self.markers.retain_mut(|m| {
            if m.start_frame < n {
                false
            } else {
                m.start_frame -= n;
                true
            }
        });
        dropped.markers = before - self.markers.len();

        dropped
    }

    /// `frames_were_removed_from_end` (§4.2.3).
    pub fn frames_removed_from_end(&mut self, frame_count: usize) -> DroppedCounts {
        self.enforce_frame_bounds(frame_count)
    }
}

/// Per-category counts of entries dropped by an invariant-enforcing pass, so
/// callers can emit the single per-category warning mandated by §7.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedCounts {
    pub loops: usize,
    pub markers: usize,
    pub regions: usize,
}

impl DroppedCounts {
    pub fn any(&self) -> bool {
        self.loops > 0 || self.markers > 0 || self.regions > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Metadata {
        Metadata {
            midi_mapping: None,
            timing_info: None,
            loops: vec![Loop {
                name: None,
                loop_type: LoopType::Forward,
                start_frame: 10,
                num_frames: 20,
                num_times_to_loop: 0,
            }],
            markers: vec![Marker {
                name: None,
                start_frame: 5,
            }],
            regions: vec![Region {
                initial_marker_name: None,
                name: None,
                start_frame: 0,
                num_frames: 100,
            }],
        }
    }

    #[test]
    fn enforce_frame_bounds_drops_out_of_range_entries() {
        let mut m = sample_metadata();
        let dropped = m.enforce_frame_bounds(15);
        assert_eq!(m.loops.len(), 0); // 10 + 20 > 15
        assert_eq!(m.markers.len(), 1); // 5 < 15
        assert_eq!(m.regions.len(), 0); // 0 + 100 > 15
        assert_eq!(dropped.loops, 1);
        assert_eq!(dropped.regions, 1);
        assert_eq!(dropped.markers, 0);
    }

    #[test]
    fn was_stretched_scales_and_truncates() {
        let mut m = sample_metadata();
        m.was_stretched(2.0, 1000);
        assert_eq!(m.loops[0].start_frame, 20);
        assert_eq!(m.loops[0].num_frames, 40);
        assert_eq!(m.markers[0].start_frame, 10);
    }

    #[test]
    fn frames_removed_from_start_drops_and_shifts() {
        let mut m = sample_metadata();
        let dropped = m.frames_removed_from_start(8);
        // marker at 5 < 8 -> dropped
        assert_eq!(dropped.markers, 1);
        assert!(m.markers.is_empty());
        // loop at 10 >= 8 -> shifted to 2
        assert_eq!(m.loops[0].start_frame, 2);
        // region at 0 < 8 -> dropped
        assert_eq!(dropped.regions, 1);
    }

    #[test]
    fn sampler_mapping_clamp() {
        let mut s = SamplerMapping {
            fine_tune_cents: 100,
            gain_db: -100,
            low_note: 200,
            high_note: 200,
            low_velocity: 0,
            high_velocity: 200,
        };
        s.clamp();
        assert_eq!(s.fine_tune_cents, 50);
        assert_eq!(s.gain_db, -64);
        assert_eq!(s.low_note, 127);
        assert_eq!(s.low_velocity, 1);
        assert_eq!(s.high_velocity, 127);
    }
}
