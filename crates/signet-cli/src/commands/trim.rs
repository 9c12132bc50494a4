use clap::Args;
use signet_processors::{Processor, Trim};

#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Frames to remove from the start.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Frames to remove from the end.
    #[arg(long, default_value_t = 0)]
    end: usize,
}

pub fn build(args: &TrimArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(Trim::new(args.start, args.end)))
}
