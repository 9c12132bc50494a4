use clap::Args;
use signet_processors::{Processor, RemoveSilence};

#[derive(Args, Debug)]
pub struct RemoveSilenceArgs {
    /// Frames at or below this level (dBFS) are considered silent.
    #[arg(long, default_value_t = -90.0)]
    threshold_db: f64,
}

pub fn build(args: &RemoveSilenceArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(RemoveSilence::new(args.threshold_db)))
}
