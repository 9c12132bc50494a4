use clap::{Args, ValueEnum};
use signet_processors::{Normalize, NormalizeMeasure, Processor};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MeasureArg {
    Peak,
    Rms,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Target level, linear `0..1`.
    target: f64,

    #[arg(long, value_enum, default_value_t = MeasureArg::Peak)]
    measure: MeasureArg,

    /// Normalize each file to `target` on its own instead of sharing one
    /// batch-common gain.
    #[arg(long)]
    independently: bool,

    /// Interpolate between no change (0) and the full computed gain (100).
    #[arg(long, default_value_t = 100.0)]
    mix: f64,
}

pub fn build(args: &NormalizeArgs) -> anyhow::Result<Box<dyn Processor>> {
    let measure = match args.measure {
        MeasureArg::Peak => NormalizeMeasure::Peak,
        MeasureArg::Rms => NormalizeMeasure::Rms,
    };
    Ok(Box::new(Normalize::new(measure, args.target, args.independently, args.mix)))
}
