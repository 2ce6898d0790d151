//! # Push Command Implementation
//!
//! Synchronizes matching targets back to their source, with `--delete`, so
//! deletions made locally propagate. Paths that were merely evicted (not
//! deleted through `exclude --delete`) are protected by the filter rules
//! and survive on the source.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use offlinecopy::rsync::{self, DryRunMode, TransferOptions};
use offlinecopy::store::resolve_path;
use offlinecopy::target::Target;

use super::Context;

/// Transfer one or more targets to their source
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Equivalent to `--dry-run rsync` plus `-v`: show the diff to the
    /// remote without transferring
    #[arg(long)]
    pub diff: bool,

    /// Invert the selection: push every target except the named ones
    #[arg(long = "not")]
    pub invert: bool,

    /// Zero or more target destination directories. If none is given, all
    /// targets are pushed.
    #[arg(value_name = "PATH")]
    pub targets: Vec<PathBuf>,

    /// Perform a dry run instead of an actual run (`local` prints the rsync
    /// command, `rsync` passes --dry-run)
    #[arg(
        short = 'n',
        long,
        value_enum,
        value_name = "MODE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "local"
    )]
    pub dry_run: Option<DryRunMode>,

    /// Options passed to rsync during this command only
    #[arg(long = "rsync", value_name = "OPTION")]
    pub rsync_opts: Vec<String>,
}

/// Execute the `push` command.
pub fn execute(args: PushArgs, ctx: Context) -> Result<()> {
    let mut verbosity = ctx.verbosity;
    let mut dry_run = args.dry_run;
    if args.diff {
        dry_run = Some(DryRunMode::Rsync);
        verbosity = verbosity.max(1);
    }

    let targets = ctx.registry.targets();
    let mut matched = select_targets(targets, &args.targets)?;

    if args.invert {
        matched = (0..targets.len())
            .filter(|index| !matched.contains(index))
            .collect();
    }

    if matched.is_empty() {
        bail!("no targets selected");
    }

    matched.sort_by(|&a, &b| targets[a].destination.cmp(&targets[b].destination));

    for index in matched {
        let target = &targets[index];
        if verbosity > 0 {
            println!("pushing target {}", target.destination.display());
        }
        let options = TransferOptions {
            verbosity,
            delete: true,
            revert: false,
            dry_run,
            extra_args: args.rsync_opts.clone(),
        };
        rsync::sync_target(&ctx.settings, target, &options)?;
    }

    Ok(())
}

/// Map selection paths to registry indices; no selection selects all.
/// Selection paths matching no target are an error.
fn select_targets(targets: &[Target], selection: &[PathBuf]) -> Result<Vec<usize>> {
    if selection.is_empty() {
        return Ok((0..targets.len()).collect());
    }

    let mut unmatched: Vec<PathBuf> = selection.iter().map(|path| resolve_path(path)).collect();
    let mut matched = Vec::new();
    for (index, target) in targets.iter().enumerate() {
        let dest = resolve_path(&target.destination);
        if let Some(position) = unmatched.iter().position(|path| *path == dest) {
            unmatched.remove(position);
            matched.push(index);
        }
    }

    if let Some(stray) = unmatched.first() {
        bail!("no matching target for path: {}", stray.display());
    }
    Ok(matched)
}
