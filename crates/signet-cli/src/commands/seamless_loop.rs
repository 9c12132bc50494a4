use clap::Args;
use signet_processors::{Processor, SeamlessLoop};

#[derive(Args, Debug)]
pub struct SeamlessLoopArgs {
    /// Percentage of the file (0..=50) cross-faded from tail onto head.
    percent: f64,
}

pub fn build(args: &SeamlessLoopArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(SeamlessLoop::new(args.percent)))
}
