//! CLI argument parsing and command dispatch

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use offlinecopy::output::OutputConfig;

use crate::commands::{self, Context};

/// offlinecopy - Selectively pick directories which are synchronized with a
/// remote source (or possibly another directory)
#[derive(Parser, Debug)]
#[command(name = "offlinecopy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (up to -vvv)
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new synchronization target
    Add(commands::add::AddArgs),

    /// Remove an existing synchronization target
    Remove(commands::remove::RemoveArgs),

    /// Exclude a file or directory from synchronization
    Exclude(commands::exclude::ExcludeArgs),

    /// (Re-)include a previously evicted (sub-)directory
    Include(commands::include::IncludeArgs),

    /// (Re-)include and copy a directory to the local file system
    Summon(commands::include::IncludeArgs),

    /// Transfer one or more targets to their source
    Push(commands::push::PushArgs),

    /// Transfer one or more targets from their source
    Revert(commands::revert::RevertArgs),

    /// Show the target configuration
    #[command(alias = "list")]
    Status,

    /// Change the source of a target
    SetSource(commands::set_source::SetSourceArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = self
            .log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow!("invalid log level: {}", self.log_level))?;
        let _ = env_logger::Builder::new().filter_level(level).try_init();

        let output = OutputConfig::from_env_and_flag(&self.color);
        let verbosity = self.verbose;

        match self.command {
            Commands::Completions(args) => commands::completions::execute(args),
            Commands::Add(args) => commands::add::execute(args, Context::load(output, verbosity)?),
            Commands::Remove(args) => {
                commands::remove::execute(args, Context::load(output, verbosity)?)
            }
            Commands::Exclude(args) => {
                commands::exclude::execute(args, Context::load(output, verbosity)?)
            }
            Commands::Include(args) => {
                commands::include::execute(args, Context::load(output, verbosity)?, false)
            }
            Commands::Summon(args) => {
                commands::include::execute(args, Context::load(output, verbosity)?, true)
            }
            Commands::Push(args) => {
                commands::push::execute(args, Context::load(output, verbosity)?)
            }
            Commands::Revert(args) => {
                commands::revert::execute(args, Context::load(output, verbosity)?)
            }
            Commands::Status => commands::status::execute(Context::load(output, verbosity)?),
            Commands::SetSource(args) => {
                commands::set_source::execute(args, Context::load(output, verbosity)?)
            }
        }
    }
}
