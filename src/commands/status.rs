//! # Status Command Implementation
//!
//! Prints every registered target together with the rsync filter rules its
//! current include/exclude state compiles to. The rules shown are exactly
//! the rules a `push` or `revert` would hand to rsync.

use anyhow::Result;

use super::Context;

/// Execute the `status` command.
pub fn execute(ctx: Context) -> Result<()> {
    if ctx.registry.is_empty() {
        println!("no targets configured");
        return Ok(());
    }

    for target in ctx.registry.targets() {
        let suffix = if target.source.ends_with('/') { "/" } else { "" };
        println!(
            "{} => {}{}",
            target.source,
            target.destination.display(),
            suffix
        );
        for rule in target.filter_rules() {
            println!("  {}", rule);
        }
    }

    Ok(())
}
