//! # Revert Command Implementation
//!
//! Re-transfers matching targets from their source; local contents that are
//! not evicted are overwritten or removed in favour of the source. Because
//! that is potentially destructive, targets must be named explicitly unless
//! `--all` is given.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use offlinecopy::rsync::{self, DryRunMode, TransferOptions};
use offlinecopy::store::resolve_path;

use super::Context;

/// Transfer one or more targets from their source
#[derive(Args, Debug)]
pub struct RevertArgs {
    /// Allow an empty selection, meaning *all* registered targets
    #[arg(long)]
    pub all: bool,

    /// One or more target destination directories
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

/// Execute the `revert` command.
pub fn execute(args: RevertArgs, ctx: Context) -> Result<()> {
    if args.targets.is_empty() && !args.all {
        bail!("no target selected (did you mean --all?)");
    }

    let targets = ctx.registry.targets();
    let matched: Vec<usize> = if args.targets.is_empty() {
        (0..targets.len()).collect()
    } else {
        let mut unmatched: Vec<PathBuf> =
            args.targets.iter().map(|path| resolve_path(path)).collect();
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
        matched
    };

    for index in matched {
        let target = &targets[index];
        let options = TransferOptions {
            verbosity: ctx.verbosity,
            delete: true,
            revert: true,
            dry_run: args.dry_run,
            extra_args: args.rsync_opts.clone(),
        };
        rsync::sync_target(&ctx.settings, target, &options)?;
    }

    Ok(())
}
