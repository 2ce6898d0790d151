//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `offlinecopy` command-line tool. Each subcommand is defined in its own
//! file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and
//!   options, derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the shared
//!   [`Context`] and performs the command's logic.
//!
//! The [`Context`] carries the loaded user settings and target registry, so
//! every command sees the same configuration state and persists changes to
//! the same store.

use offlinecopy::defaults;
use offlinecopy::error::Result;
use offlinecopy::output::OutputConfig;
use offlinecopy::settings::Settings;
use offlinecopy::store::TargetRegistry;

pub mod add;
pub mod completions;
pub mod exclude;
pub mod include;
pub mod push;
pub mod remove;
pub mod revert;
pub mod set_source;
pub mod status;

/// Shared state loaded once per invocation and handed to every command.
pub struct Context {
    pub settings: Settings,
    pub registry: TargetRegistry,
    pub output: OutputConfig,
    pub verbosity: u8,
}

impl Context {
    /// Load settings and the target registry from the configuration
    /// directory.
    pub fn load(output: OutputConfig, verbosity: u8) -> Result<Self> {
        let settings = Settings::load(&defaults::settings_path())?;
        let registry = TargetRegistry::load(&defaults::targets_path())?;
        Ok(Self {
            settings,
            registry,
            output,
            verbosity,
        })
    }

    /// Persist the target registry back to the configuration directory.
    pub fn save_registry(&self) -> Result<()> {
        self.registry.save(&defaults::targets_path())
    }
}
