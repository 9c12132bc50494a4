use clap::Args;
use signet_processors::{Folderise, Processor};

#[derive(Args, Debug)]
pub struct FolderiseArgs {
    /// Regex matched against the filename.
    pattern: String,

    /// Destination folder template; `<n>` refers to regex group `n`.
    folder_template: String,
}

pub fn build(args: &FolderiseArgs) -> anyhow::Result<Box<dyn Processor>> {
    Ok(Box::new(Folderise::new(&args.pattern, args.folder_template.clone())?))
}
