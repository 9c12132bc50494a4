use clap::Args;
use signet_processors::{Processor, Tune};

#[derive(Args, Debug)]
pub struct TuneArgs {
    /// Pitch shift in cents; positive shifts up.
    cents: f64,
}

pub fn build(args: &TuneArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(Tune::new(args.cents)))
}
