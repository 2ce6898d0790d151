//! # Exclude Command Implementation
//!
//! Excludes a file or directory (and, for directories, all of their
//! contents) from synchronization. With `--delete`, the local copy is
//! removed afterwards, freeing the space while the source keeps the data.

use anyhow::{bail, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use offlinecopy::filter::State;
use offlinecopy::output::emoji;
use offlinecopy::store::resolve_path;

use super::Context;

/// Exclude a file or directory from synchronization
#[derive(Args, Debug)]
pub struct ExcludeArgs {
    /// Path to exclude
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Delete the file or directory after evicting it
    #[arg(long, visible_alias = "evict")]
    pub delete: bool,
}

/// Execute the `exclude` command.
pub fn execute(args: ExcludeArgs, mut ctx: Context) -> Result<()> {
    let path = resolve_path(&args.path);

    let relative = {
        let Some((target, relative)) = ctx.registry.find_enclosing_mut(&path) else {
            bail!("{} is not inside any target", path.display());
        };
        if target.get_state(&relative) == State::Evicted {
            bail!("already excluded: {}", path.display());
        }
        target.evict(&relative);
        target.prune();
        relative
    };

    ctx.save_registry()?;

    println!(
        "{} Excluded {} (as /{} within its target)",
        emoji(&ctx.output, "🚫", "[EXCL]"),
        path.display(),
        relative
    );

    if args.delete {
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        println!("Deleted local copy of {}", path.display());
    }

    Ok(())
}
