use clap::Args;
use signet_processors::{Processor, ZcrossOffset};

#[derive(Args, Debug)]
pub struct ZcrossOffsetArgs {}

pub fn build(_args: &ZcrossOffsetArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(ZcrossOffset))
}
