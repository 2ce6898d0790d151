//! # rsync Invocation
//!
//! Builds and runs the rsync commands behind push, revert, include and
//! summon. The compiled filter rules are rendered into a temporary filter
//! file which rsync merges via `--filter ". FILE"`; the file lives for the
//! duration of the invocation.
//!
//! This uses the system rsync binary, which automatically handles SSH
//! configuration, remote shells and every transport rsync itself supports.
//!
//! Dry runs come in two flavours, mirroring what users need most:
//! - `local`: prefix the whole command line with `echo`, printing what
//!   would run without invoking rsync at all.
//! - `rsync`: pass `--dry-run` so rsync reports the transfer it would do.

use clap::ValueEnum;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::target::Target;

/// How a dry run is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DryRunMode {
    /// Print the rsync command line instead of executing it.
    Local,
    /// Execute rsync with `--dry-run`.
    Rsync,
}

/// Per-invocation transfer options.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Verbosity level from the CLI's `-v` count.
    pub verbosity: u8,
    /// Propagate local deletions (`--delete`).
    pub delete: bool,
    /// Transfer source -> destination instead of destination -> source.
    pub revert: bool,
    /// Optional dry-run mode.
    pub dry_run: Option<DryRunMode>,
    /// Extra rsync arguments for this invocation only.
    pub extra_args: Vec<String>,
}

/// The base rsync command line: archive-style flags, user settings, delete
/// and verbosity handling.
pub fn invocation_base(settings: &Settings, verbosity: u8, delete: bool) -> Vec<String> {
    let mut cmd = vec![
        "rsync".to_string(),
        "-raHEAXS".to_string(),
        "--protect-args".to_string(),
    ];

    cmd.extend(settings.rsync_options.iter().cloned());

    if delete {
        cmd.push("--delete".to_string());
    }

    if verbosity >= 1 {
        cmd.push("-v".to_string());
        cmd.push("--itemize-changes".to_string());
    }

    if verbosity <= 2 {
        cmd.push("--progress".to_string());
    }

    cmd
}

/// Render a target's compiled filter rules into a temporary filter file.
///
/// The returned handle owns the file; it is deleted when dropped, so keep
/// it alive until the rsync process has exited.
pub fn write_filter_file(target: &Target) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for rule in target.filter_rules() {
        writeln!(file, "{}", rule)?;
    }
    file.flush()?;
    Ok(file)
}

/// Rewrite a command line for the given dry-run mode.
pub fn apply_dry_run(cmd: &mut Vec<String>, mode: DryRunMode) {
    match mode {
        DryRunMode::Local => cmd.insert(0, "echo".to_string()),
        DryRunMode::Rsync => cmd.insert(1, "--dry-run".to_string()),
    }
}

/// Run a fully assembled command line, applying the dry-run mode first.
pub fn run(mut cmd: Vec<String>, dry_run: Option<DryRunMode>) -> Result<()> {
    if let Some(mode) = dry_run {
        apply_dry_run(&mut cmd, mode);
    }

    log::debug!("running: {}", cmd.join(" "));
    let status = Command::new(&cmd[0]).args(&cmd[1..]).status()?;
    if !status.success() {
        return Err(Error::Rsync {
            command: cmd.join(" "),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Synchronize a whole target through its filter rules.
///
/// Pushing transfers destination -> source; reverting transfers source ->
/// destination. Either way the filter file decides which paths take part.
pub fn sync_target(settings: &Settings, target: &Target, options: &TransferOptions) -> Result<()> {
    let mut cmd = invocation_base(settings, options.verbosity, options.delete);

    let filter_file = write_filter_file(target)?;
    cmd.push("--filter".to_string());
    cmd.push(format!(". {}", filter_file.path().display()));
    cmd.extend(options.extra_args.iter().cloned());

    let dest = directory_argument(&target.destination);
    if options.revert {
        cmd.push(target.source.clone());
        cmd.push(dest);
    } else {
        cmd.push(dest);
        cmd.push(target.source.clone());
    }

    run(cmd, options.dry_run)
}

/// Transfer a single sub-path of a target from its source, without touching
/// anything else and without overwriting local files.
pub fn summon_path(
    settings: &Settings,
    target: &Target,
    relative: &str,
    options: &TransferOptions,
) -> Result<()> {
    let mut cmd = invocation_base(settings, options.verbosity, false);
    cmd.extend(options.extra_args.iter().cloned());
    cmd.push("--ignore-existing".to_string());
    cmd.push(join_remote(&target.source, relative));
    cmd.push(directory_argument(&join_local(&target.destination, relative)));
    run(cmd, options.dry_run)
}

/// A local path as an rsync directory argument: trailing slash when it is a
/// directory, so contents land inside it rather than nesting it.
fn directory_argument(path: &Path) -> String {
    let mut argument = path.display().to_string();
    if path.is_dir() && !argument.ends_with('/') {
        argument.push('/');
    }
    argument
}

/// Append a target-relative path to an rsync source spec, always yielding a
/// directory-style (trailing slash) argument.
fn join_remote(source: &str, relative: &str) -> String {
    let mut joined = source.trim_end_matches('/').to_string();
    let relative = relative.trim_matches('/');
    if !relative.is_empty() {
        joined.push('/');
        joined.push_str(relative);
    }
    joined.push('/');
    joined
}

fn join_local(destination: &Path, relative: &str) -> std::path::PathBuf {
    let relative = relative.trim_matches('/');
    if relative.is_empty() {
        destination.to_path_buf()
    } else {
        destination.join(relative)
    }
}
