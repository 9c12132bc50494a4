//! One `Args` struct per processor subcommand (§4.5, §11), mirroring
//! `sonido-cli`'s `commands::*::Args` + dispatch shape. `signet-cli`'s CLI
//! surface is explicitly out of scope for correctness (spec.md §1), so
//! these favor ordinary `clap` derive conventions over a literal
//! reproduction of the original tool's flag syntax.

mod auto_tune;
mod convert;
mod fade;
mod folderise;
mod gain;
mod normalize;
mod print_info;
mod remove_silence;
mod rename;
mod retune;
mod sample_blend;
mod seamless_loop;
mod trim;
mod tune;
mod zcross_offset;

use clap::Subcommand;
use signet_processors::Processor;

use crate::config::SignetConfig;

/// Every subcommand name `main`'s chain-splitter recognizes, in the same
/// kebab-case `clap::Subcommand` derives for each variant below.
pub const SUBCOMMAND_NAMES: &[&str] = &[
    "gain",
    "normalize",
    "fade",
    "trim",
    "remove-silence",
    "convert",
    "tune",
    "auto-tune",
    "retune",
    "rename",
    "folderise",
    "sample-blend",
    "seamless-loop",
    "print-info",
    "zcross-offset",
];

#[derive(Subcommand, Debug)]
pub enum ProcessorCommand {
    /// Flat linear gain, in dB or percent.
    Gain(gain::GainArgs),
    /// Peak or RMS normalization, batch-common or per-file.
    Normalize(normalize::NormalizeArgs),
    /// Fade in or out over a fixed number of frames.
    Fade(fade::FadeArgs),
    /// Remove a fixed number of frames from the start and/or end.
    Trim(trim::TrimArgs),
    /// Trim leading/trailing silence below a threshold.
    RemoveSilence(remove_silence::RemoveSilenceArgs),
    /// Change sample rate, bit depth, and/or container.
    Convert(convert::ConvertArgs),
    /// Shift pitch by a fixed number of cents.
    Tune(tune::TuneArgs),
    /// Detect pitch and snap to the nearest semitone.
    AutoTune(auto_tune::AutoTuneArgs),
    /// Correct pitch drift across the file (§4.6).
    Retune(retune::RetuneArgs),
    /// Rename via `<token>` substitution.
    Rename(rename::RenameArgs),
    /// Move matching files into a templated subfolder.
    Folderise(folderise::FolderiseArgs),
    /// Synthesize in-between semitones from neighbouring root-noted samples.
    SampleBlend(sample_blend::SampleBlendArgs),
    /// Cross-fade the tail onto the head to make a seamless loop point.
    SeamlessLoop(seamless_loop::SeamlessLoopArgs),
    /// Log a summary of each file; makes no changes.
    PrintInfo(print_info::PrintInfoArgs),
    /// Rotate loop/region start frames to the nearest zero crossing.
    ZcrossOffset(zcross_offset::ZcrossOffsetArgs),
}

impl ProcessorCommand {
    pub fn build(&self, config: &SignetConfig) -> anyhow::Result<Box<dyn Processor>> {
        match self {
            ProcessorCommand::Gain(a) => gain::build(a),
            ProcessorCommand::Normalize(a) => normalize::build(a),
            ProcessorCommand::Fade(a) => fade::build(a),
            ProcessorCommand::Trim(a) => trim::build(a),
            ProcessorCommand::RemoveSilence(a) => remove_silence::build(a),
            ProcessorCommand::Convert(a) => convert::build(a, config),
            ProcessorCommand::Tune(a) => tune::build(a),
            ProcessorCommand::AutoTune(a) => auto_tune::build(a),
            ProcessorCommand::Retune(a) => retune::build(a, config),
            ProcessorCommand::Rename(a) => rename::build(a),
            ProcessorCommand::Folderise(a) => folderise::build(a),
            ProcessorCommand::SampleBlend(a) => sample_blend::build(a),
            ProcessorCommand::SeamlessLoop(a) => seamless_loop::build(a),
            ProcessorCommand::PrintInfo(a) => print_info::build(a),
            ProcessorCommand::ZcrossOffset(a) => zcross_offset::build(a),
        }
    }
}

/// The whole chain is one `clap::Parser` over a single subcommand, parsed
/// once per chain segment (see `main`'s splitter).
#[derive(clap::Parser, Debug)]
#[command(name = "signet", no_binary_name = true)]
pub struct ProcessorInvocation {
    #[command(subcommand)]
    pub command: ProcessorCommand,
}
