//! # Set-Source Command Implementation
//!
//! Rewrites the source of an existing target, e.g. after a server rename.
//! The include/exclude state of the target is kept as-is.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use offlinecopy::error::Error;
use offlinecopy::output::emoji;
use offlinecopy::store::resolve_path;

use super::Context;

/// Change the source of a target
#[derive(Args, Debug)]
pub struct SetSourceArgs {
    /// Destination directory of the target to change
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// New source, e.g. `host:/srv/music/` or a local directory
    #[arg(value_name = "SOURCE")]
    pub source: String,
}

/// Execute the `set-source` command.
pub fn execute(args: SetSourceArgs, mut ctx: Context) -> Result<()> {
    let dest = resolve_path(&args.dest);

    let Some(target) = ctx.registry.get_mut(&dest) else {
        return Err(Error::NoSuchTarget { path: dest }.into());
    };
    let previous = std::mem::replace(&mut target.source, args.source.clone());
    ctx.save_registry()?;

    println!(
        "{} Changed source of {} from {} to {}",
        emoji(&ctx.output, "🔀", "[SRC]"),
        dest.display(),
        previous,
        args.source
    );
    Ok(())
}
