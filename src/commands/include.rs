//! # Include / Summon Command Implementation
//!
//! `include` marks a path for synchronization without transferring
//! anything. `summon` additionally copies the path's contents from the
//! source right away, with `--ignore-existing` so local files win, and
//! without touching anything else inside the target.
//!
//! Both share the same arguments and implementation; the dispatcher passes
//! the `summon` flag.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use offlinecopy::filter::State;
use offlinecopy::output::emoji;
use offlinecopy::rsync::{self, DryRunMode, TransferOptions};
use offlinecopy::store::resolve_path;

use super::Context;

/// (Re-)include a previously evicted (sub-)directory
#[derive(Args, Debug)]
pub struct IncludeArgs {
    /// Path to include
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Perform a dry run instead of an actual run. With `local`, the rsync
    /// command is printed but not executed; with `rsync`, rsync gets passed
    /// --dry-run. State changes are not persisted during dry runs.
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

    /// Options passed to rsync during this command only. Use
    /// --rsync=OPTION syntax for options starting with `-`.
    #[arg(long = "rsync", value_name = "OPTION")]
    pub rsync_opts: Vec<String>,
}

/// Execute the `include` (or, with `summon`, the `summon`) command.
pub fn execute(args: IncludeArgs, mut ctx: Context, summon: bool) -> Result<()> {
    let path = resolve_path(&args.path);

    let (target, relative) = {
        let Some((target, relative)) = ctx.registry.find_enclosing_mut(&path) else {
            bail!("{} is not inside any target", path.display());
        };
        if target.get_state(&relative) == State::Included {
            bail!("already included: {}", path.display());
        }
        target.include(&relative);
        target.prune();
        (target.clone(), relative)
    };

    if summon {
        let options = TransferOptions {
            verbosity: ctx.verbosity,
            dry_run: args.dry_run,
            extra_args: args.rsync_opts,
            ..TransferOptions::default()
        };
        rsync::summon_path(&ctx.settings, &target, &relative, &options)?;
    }

    // a dry run must not persist the inclusion either
    if args.dry_run.is_none() {
        ctx.save_registry()?;
        println!(
            "{} Included {} (as /{} within its target)",
            emoji(&ctx.output, "📥", "[INCL]"),
            path.display(),
            relative
        );
    }

    Ok(())
}
