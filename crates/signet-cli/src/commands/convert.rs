use clap::{Args, ValueEnum};
use signet_core::ContainerFormat;
use signet_processors::{Convert, Processor};

use crate::config::SignetConfig;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ContainerArg {
    Wav,
    Flac,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    bits: Option<u16>,

    #[arg(long, value_enum)]
    container: Option<ContainerArg>,
}

pub fn build(args: &ConvertArgs, config: &SignetConfig) -> anyhow::Result<Box<dyn Processor>> {
    let container = args.container.map(|c| match c {
        ContainerArg::Wav => ContainerFormat::Wav,
        ContainerArg::Flac => ContainerFormat::Flac,
    });
    // Changing container without an explicit `--bits` falls back to the
    // configured default rather than carrying over a bit depth that might
    // not be valid in the new container (§10.3).
    let bits = args.bits.or(if container.is_some() { Some(config.default_output_bits) } else { None });
    Ok(Box::new(Convert::new(args.sample_rate, bits, container)?))
}
