use clap::Args;
use signet_processors::{Processor, Rename};

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Pattern with `<token>` substitutions (`<counter>`, `<alpha-counter>`,
    /// `<detected-pitch>`, `<detected-midi-note>`, `<detected-note>`,
    /// `<detected-note-no-octave>`, `<parent-folder>[-snake|-camel]`).
    pattern: String,
}

pub fn build(args: &RenameArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(Rename::new(args.pattern.clone())))
}
