use clap::Args;
use signet_processors::{Gain, GainUnit, Processor};

#[derive(Args, Debug)]
pub struct GainArgs {
    /// Gain amount; interpreted as dB unless `--percent` is given.
    value: f64,

    /// Interpret `value` as a percentage of full scale instead of dB.
    #[arg(long)]
    percent: bool,
}

pub fn build(args: &GainArgs) -> anyhow::Result<Box<dyn Processor>> {
    let unit = if args.percent { GainUnit::Percent } else { GainUnit::Db };
    Ok(Box::new(Gain::new(args.value, unit)?))
}
