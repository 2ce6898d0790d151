//! # Add Command Implementation
//!
//! Registers a new synchronization target: a remote source (standard
//! scp/rsync syntax like `user@host:/path/`) paired with a local
//! destination directory. Adding a target transfers nothing; new targets
//! start fully evicted, so the user summons or includes paths afterwards.
//!
//! The destination must not overlap any registered target in either
//! direction, otherwise a single local path would belong to two filter
//! trees.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use offlinecopy::output::emoji;
use offlinecopy::store::resolve_path;
use offlinecopy::target::Target;

use super::Context;

/// Add a new synchronization target
#[derive(Args, Debug)]
pub struct AddArgs {
    /// URL for the source of the target (e.g. user@host:/path/)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Path for the destination of the target. Must not be within another
    /// target; symlinks and relative paths are resolved.
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, mut ctx: Context) -> Result<()> {
    let dest = resolve_path(&args.dest);

    // rsync treats "src" and "src/" differently: only the latter copies the
    // directory's contents into the destination
    let mut source = args.source;
    if dest.is_dir() && !source.ends_with('/') {
        source.push('/');
    }

    ctx.registry.add(Target::new(source.clone(), dest.clone()))?;
    ctx.save_registry()?;

    println!(
        "{} Added target {} => {}",
        emoji(&ctx.output, "✅", "[OK]"),
        source,
        dest.display()
    );
    println!("New targets start excluded; use `offlinecopy summon` to fetch contents.");
    Ok(())
}
