//! # Remove Command Implementation
//!
//! Drops a target from the bookkeeping. No files are deleted, but all
//! include/exclude state of the target is gone.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use offlinecopy::output::emoji;
use offlinecopy::store::resolve_path;

use super::Context;

/// Remove an existing synchronization target
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Remove the target with the given destination directory
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,
}

/// Execute the `remove` command.
pub fn execute(args: RemoveArgs, mut ctx: Context) -> Result<()> {
    let dest = resolve_path(&args.dest);
    let removed = ctx.registry.remove(&dest)?;
    ctx.save_registry()?;

    println!(
        "{} Removed target {} => {} (local files untouched)",
        emoji(&ctx.output, "🗑️", "[DEL]"),
        removed.source,
        removed.destination.display()
    );
    Ok(())
}
