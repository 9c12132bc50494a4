use clap::Args;
use signet_processors::{Processor, PrintInfo};

#[derive(Args, Debug)]
pub struct PrintInfoArgs {}

pub fn build(_args: &PrintInfoArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(PrintInfo))
}
