//! Signet CLI — a thin, explicitly out-of-scope-for-correctness shell
//! (spec.md §1) wiring the path resolver, file collection, processors, and
//! commit/backup engine into a runnable `signet` binary.
//!
//! `signet <include-tokens…> [--recursive] [--silent] [--undo |
//! --clear-backup] <subcommand> [args…]`, with further subcommands
//! chainable after the first (§6). `clap::Subcommand` only ever recognizes
//! one subcommand per invocation, so the chain is split by hand before
//! each segment is handed to `clap`.

mod commands;
mod config;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use commands::{ProcessorInvocation, SUBCOMMAND_NAMES};
use config::SignetConfig;
use signet_core::path_resolver::{FilePathSet, ResolverOptions};
use signet_core::FileCollection;

/// Flags recognized before the first subcommand; everything else in that
/// leading segment is an include/exclude token (§4.1).
#[derive(Parser, Debug)]
#[command(name = "signet", no_binary_name = true)]
struct GlobalArgs {
    /// Include/exclude selection tokens (glob patterns; `-` prefix
    /// excludes).
    tokens: Vec<String>,

    /// Expand directory tokens recursively instead of one level deep.
    #[arg(long)]
    recursive: bool,

    /// Raise the default log level from `warn` to `error`.
    #[arg(long)]
    silent: bool,

    /// Reverse the last commit instead of running the edit pipeline.
    #[arg(long, conflicts_with = "clear_backup")]
    undo: bool,

    /// Discard the last commit's journal/blob store without reversing it.
    #[arg(long)]
    clear_backup: bool,
}

/// Split `argv` (without the program name) into a leading global segment
/// and a sequence of `(subcommand_name, args)` segments, scanning for
/// tokens that name a recognized subcommand.
fn split_chain(argv: &[String]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut global = Vec::new();
    let mut segments: Vec<Vec<String>> = Vec::new();

    for token in argv {
        if SUBCOMMAND_NAMES.contains(&token.as_str()) {
            segments.push(vec![token.clone()]);
        } else if let Some(segment) = segments.last_mut() {
            segment.push(token.clone());
        } else {
            global.push(token.clone());
        }
    }
    (global, segments)
}

fn init_tracing(silent: bool) {
    let default_level = if silent { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();
}

fn run() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let (global_argv, segments) = split_chain(&argv);

    let global = GlobalArgs::parse_from(&global_argv);
    init_tracing(global.silent);

    if global.undo || global.clear_backup {
        if global.clear_backup {
            signet_backup::blob_store::clear()?;
            let _ = std::fs::remove_file(signet_backup::paths::journal_path());
            println!("backup cleared");
            return Ok(());
        }
        match signet_backup::undo()? {
            Some(stats) => println!(
                "undo: {} file(s) deleted, {} move(s) reversed, {} file(s) restored",
                stats.files_deleted, stats.moves_reversed, stats.files_restored
            ),
            None => println!("nothing to undo"),
        }
        return Ok(());
    }

    let config = SignetConfig::load()?;

    let mut commands = Vec::with_capacity(segments.len());
    for segment in &segments {
        let invocation = ProcessorInvocation::parse_from(segment);
        commands.push(invocation.command);
    }
    if commands.is_empty() {
        anyhow::bail!("no subcommand given; expected at least one of: {}", SUBCOMMAND_NAMES.join(", "));
    }

    let opts = ResolverOptions { recursive: global.recursive };
    let path_set = FilePathSet::resolve(&global.tokens, opts)?;
    if path_set.is_empty() {
        anyhow::bail!("no files matched the given selection");
    }

    let mut collection = FileCollection::from_paths(path_set.into_vec());
    let codec = signet_codec::Codec;
    let mut journal = signet_backup::BackupJournal::default();

    for command in &commands {
        let mut processor: Box<dyn signet_processors::Processor> = command.build(&config)?;

        let pb = if config.show_progress {
            let bar = ProgressBar::new(collection.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(&format!("{{spinner}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}", processor.name()))
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            Some(bar)
        } else {
            None
        };

        processor.process_files(&mut collection, &codec)?;
        processor.generate_files(&mut collection, &mut journal, &codec)?;

        if let Some(bar) = pb {
            bar.finish_and_clear();
        }
    }

    match signet_backup::commit_with_journal(&collection, Some(journal)) {
        Ok(stats) => {
            println!(
                "committed: {} no-op, {} renamed, {} written, {} original(s) deleted",
                stats.no_op, stats.renamed, stats.written, stats.deleted_originals
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("commit failed: {e}; run `signet --undo` to reverse what completed");
            Err(e.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    run()
}
