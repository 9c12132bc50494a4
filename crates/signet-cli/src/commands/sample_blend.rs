use clap::Args;
use signet_processors::{Processor, SampleBlend};

#[derive(Args, Debug)]
pub struct SampleBlendArgs {}

pub fn build(_args: &SampleBlendArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(SampleBlend::default()))
}
