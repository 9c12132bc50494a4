use clap::Args;
use regex::Regex;
use signet_processors::{Processor, Retune};

use crate::config::SignetConfig;

#[derive(Args, Debug)]
pub struct RetuneArgs {
    /// Chunk size in milliseconds (§4.6), 20..=200. Defaults to the
    /// configured value.
    #[arg(long)]
    chunk_ms: Option<f64>,

    /// Identical-processing-set regex with exactly one capture group
    /// (§4.6 last paragraph). Requires `--authority`.
    #[arg(long, requires = "authority")]
    group_pattern: Option<String>,

    /// The captured value identifying the authority member of each group.
    #[arg(long, requires = "group_pattern")]
    authority: Option<String>,
}

pub fn build(args: &RetuneArgs, config: &SignetConfig) -> anyhow::Result<Box<dyn Processor>> {
    let chunk_ms = args.chunk_ms.unwrap_or(config.chunk_ms as f64);
    let mut retune = Retune::new(chunk_ms);
    if let (Some(pattern), Some(authority)) = (&args.group_pattern, &args.authority) {
        retune = retune.with_identical_processing_set(Regex::new(pattern)?, authority.clone());
    }
    Ok(Box::new(retune))
}
