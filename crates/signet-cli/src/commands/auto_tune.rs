use clap::Args;
use signet_processors::{AutoTune, Processor};

#[derive(Args, Debug)]
pub struct AutoTuneArgs {}

pub fn build(_args: &AutoTuneArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(AutoTune::default()))
}
